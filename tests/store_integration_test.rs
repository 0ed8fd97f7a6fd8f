//! Integration tests for SecretStore and Resolver.
//!
//! These tests build synthetic secrets directories in a temp dir, so they
//! never depend on a real /run/secrets mount.

mod common;

use common::TestContext;
use mounted_secrets::{Resolver, SecretError, SecretStore};

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_scan_example_directory() {
        let ctx = TestContext::new().unwrap();
        ctx.create_secrets(&[("DB_PASSWORD", "p@ss\n"), ("API_KEY", "abc123")])
            .unwrap();

        let store = SecretStore::scan(&ctx.temp_path).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("DB_PASSWORD"), Some("p@ss"));
        assert_eq!(store.get("API_KEY"), Some("abc123"));
        assert_eq!(store.get("MISSING"), None);
    }

    #[test]
    fn test_one_entry_per_file() {
        let ctx = TestContext::new().unwrap();
        let files = [
            ("postgres_db", "shop\n"),
            ("postgres_user", "  app  "),
            ("postgres_host", "\tdb:5432\r\n"),
            ("postgres_passwd", "s3cr3t"),
            ("auth0_domain", "example.auth0.com\n\n"),
        ];
        ctx.create_secrets(&files[..]).unwrap();

        let store = SecretStore::scan(&ctx.temp_path).unwrap();

        assert_eq!(store.len(), files.len());
        for (name, content) in files {
            assert_eq!(store.get(name), Some(content.trim()));
        }
    }

    #[test]
    fn test_scan_nonexistent_directory() {
        let ctx = TestContext::new().unwrap();

        let store = SecretStore::scan(ctx.path("no-such-mount")).unwrap();

        assert!(store.is_empty());
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_scan_is_idempotent() {
        let ctx = TestContext::new().unwrap();
        ctx.create_secrets(&[("a", "1\n"), ("b", " 2 ")]).unwrap();

        let first = SecretStore::scan(&ctx.temp_path).unwrap();
        let second = SecretStore::scan(&ctx.temp_path).unwrap();

        assert_eq!(first.all(), second.all());
        assert_eq!(first, second);
    }

    #[test]
    fn test_snapshot_does_not_observe_later_changes() {
        let ctx = TestContext::new().unwrap();
        ctx.create_secret("token", "before").unwrap();

        let store = SecretStore::scan(&ctx.temp_path).unwrap();
        ctx.create_secret("token", "after").unwrap();
        ctx.create_secret("late", "value").unwrap();

        assert_eq!(store.get("token"), Some("before"));
        assert_eq!(store.get("late"), None);
    }

    #[test]
    fn test_subdirectories_are_skipped() {
        let ctx = TestContext::new().unwrap();
        ctx.create_secret("token", "t0k3n").unwrap();
        ctx.create_dir("nested").unwrap();

        let store = SecretStore::scan(&ctx.temp_path).unwrap();

        assert_eq!(store.names(), vec!["token"]);
    }

    #[test]
    fn test_empty_file_is_present_and_empty() {
        let ctx = TestContext::new().unwrap();
        ctx.create_secret("blank", "\n  \n").unwrap();

        let store = SecretStore::scan(&ctx.temp_path).unwrap();

        assert_eq!(store.get("blank"), Some(""));
    }

    #[test]
    fn test_is_secret_with_environment() {
        let store = SecretStore::new("/run/secrets", Default::default());

        std::env::set_var("MOUNTED_SECRETS_IT_DATABASE_URL", "/run/secrets/db_url");
        assert!(store.is_secret("MOUNTED_SECRETS_IT_DATABASE_URL").unwrap());

        std::env::set_var("MOUNTED_SECRETS_IT_LITERAL_URL", "postgres://literal");
        assert!(!store.is_secret("MOUNTED_SECRETS_IT_LITERAL_URL").unwrap());
    }

    #[test]
    fn test_is_secret_unset_variable() {
        let store = SecretStore::new("/run/secrets", Default::default());

        let err = store.is_secret("MOUNTED_SECRETS_IT_NEVER_SET").unwrap_err();
        assert!(matches!(err, SecretError::UndefinedVariable(ref var) if var == "MOUNTED_SECRETS_IT_NEVER_SET"));
    }

    #[test]
    fn test_resolver_reads_mounted_secret() {
        let ctx = TestContext::new().unwrap();
        ctx.create_secret("db_url", "postgres://from-secret/app\n")
            .unwrap();
        let store = SecretStore::scan(&ctx.temp_path).unwrap();

        let pointer = ctx.path("db_url");
        std::env::set_var("MOUNTED_SECRETS_IT_RESOLVE_URL", &pointer);
        std::env::set_var("MOUNTED_SECRETS_IT_RESOLVE_LITERAL", "plain-value");

        let resolver = Resolver::new(&store);
        assert_eq!(
            resolver.resolve("MOUNTED_SECRETS_IT_RESOLVE_URL").unwrap(),
            Some("postgres://from-secret/app".to_string())
        );
        assert_eq!(
            resolver.resolve("MOUNTED_SECRETS_IT_RESOLVE_LITERAL").unwrap(),
            Some("plain-value".to_string())
        );
    }
}

//! Schema template validation against local and remote `_extends` chains

mod common;

use common::{core_url, registry, FakeRemote, CORE_REPO};
use omi_schemas::loader::{Binding, ChainEnd};
use omi_schemas::validation::{DocumentValidator, FindingCode, SchemaValidator};
use omi_schemas::{CallerRepository, LoaderError, ResolutionCache, ResolverConfig, SchemaResolver};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn resolver(remote: Arc<FakeRemote>, root: &Path, config: Option<ResolverConfig>) -> SchemaResolver {
    SchemaResolver::new(
        Arc::new(registry()),
        remote,
        Arc::new(ResolutionCache::new()),
        config.unwrap_or_else(|| ResolverConfig::new(root)),
    )
}

fn write_schema(dir: &Path, name: &str, schema: serde_json::Value) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_vec_pretty(&schema).unwrap()).unwrap();
    path
}

#[cfg(test)]
mod remote_chain {
    use super::*;

    #[test]
    fn test_remote_ancestor_without_property_reports_once() {
        let remote = Arc::new(
            FakeRemote::default()
                .with_branches(CORE_REPO, &["main", "v1", "v2", "v10"])
                .with_content(core_url("X.schema.omi.json", "v10"), json!({"properties": {}})),
        );
        let dir = tempdir().unwrap();
        let path = write_schema(
            dir.path(),
            "child.schema.tpl.json",
            json!({"_extends": "/core/X.schema.omi.json", "required": ["name"], "properties": {}}),
        );

        let resolver = resolver(remote, dir.path(), None);
        let findings = SchemaValidator::new(&path, &resolver).validate().unwrap();

        assert_eq!(findings.len(), 1, "{}", findings);
        assert_eq!(findings.with_code(FindingCode::MissingRequiredProperty).len(), 1);
    }

    #[test]
    fn test_property_found_two_levels_up() {
        let remote = Arc::new(
            FakeRemote::default()
                .with_branches(CORE_REPO, &["v4.0"])
                .with_content(
                    core_url("schemas/b.schema.tpl.json", "v4.0"),
                    json!({"_extends": "schemas/c.schema.tpl.json", "properties": {}}),
                )
                .with_content(
                    core_url("schemas/c.schema.tpl.json", "v4.0"),
                    json!({"properties": {"name": {}}}),
                ),
        );
        let dir = tempdir().unwrap();
        let path = write_schema(
            dir.path(),
            "a.schema.tpl.json",
            json!({"_type": "https://x/types/A", "_extends": "/core/schemas/b.schema.tpl.json", "required": ["name"]}),
        );

        let resolver = resolver(remote.clone(), dir.path(), None);
        let findings = SchemaValidator::new(&path, &resolver).validate().unwrap();
        assert!(findings.is_empty(), "{}", findings);

        // "latest" branch discovery ran once for both ancestors
        assert_eq!(*remote.listings.lock().unwrap(), 1);
    }

    #[test]
    fn test_repeated_resolution_hits_cache() {
        let remote = Arc::new(
            FakeRemote::default()
                .with_branches(CORE_REPO, &["v1"])
                .with_content(core_url("X.schema.omi.json", "v1"), json!({"properties": {"name": {}}})),
        );
        let dir = tempdir().unwrap();
        let resolver = resolver(remote.clone(), dir.path(), None);

        for _ in 0..3 {
            resolver.resolve("/core/X.schema.omi.json").unwrap();
        }
        assert_eq!(remote.fetch_count(), 1);
        let stats = resolver.cache().stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_caller_branch_binds_pinned_commit() {
        let remote = Arc::new(
            FakeRemote::default()
                .with_content(core_url("X.schema.omi.json", "3333333"), json!({"_type": "Pinned"})),
        );
        let dir = tempdir().unwrap();
        let config = ResolverConfig::new(dir.path()).with_caller(CallerRepository::new(
            "https://github.com/openMetadataInitiative/openMINDS_core",
            "v3",
        ));
        let resolver = resolver(remote.clone(), dir.path(), Some(config));

        let resolved = resolver.resolve("/core/X.schema.omi.json").unwrap();
        assert_eq!(resolved.document["_type"], "Pinned");
        assert!(matches!(resolved.binding, Binding::Module { ref version, .. } if version == "v3.0"));
        assert_eq!(*remote.listings.lock().unwrap(), 0);

        let unbound = resolver
            .resolve_as("/core/X.schema.omi.json", None)
            .unwrap_err();
        assert!(matches!(unbound, LoaderError::NoVersionBranch { .. }));
    }

    #[test]
    fn test_unknown_module_reports_missing_extends() {
        let dir = tempdir().unwrap();
        let path = write_schema(
            dir.path(),
            "a.schema.tpl.json",
            json!({"_extends": "/nonexistent/X.schema.omi.json", "properties": {}}),
        );
        let resolver = resolver(Arc::new(FakeRemote::default()), dir.path(), None);
        let findings = SchemaValidator::new(&path, &resolver).validate().unwrap();
        let missing = findings.with_code(FindingCode::MissingExtendsTarget);
        assert_eq!(missing.len(), 1);
        assert!(missing[0].message.contains("nonexistent"));
    }
}

#[cfg(test)]
mod local_chain {
    use super::*;

    #[test]
    fn test_circular_chain_terminates_walk() {
        let dir = tempdir().unwrap();
        write_schema(dir.path(), "a.json", json!({"_extends": "b.json", "properties": {}}));
        write_schema(dir.path(), "b.json", json!({"_extends": "a.json", "properties": {}}));
        let path = write_schema(
            dir.path(),
            "start.json",
            json!({"_type": "Start", "_extends": "a.json", "required": ["id"], "properties": {}}),
        );

        let resolver = resolver(Arc::new(FakeRemote::default()), dir.path(), None);
        let chain = resolver.resolve_chain("a.json", None);
        assert!(matches!(chain.end, ChainEnd::Circular(_)));

        let findings = SchemaValidator::new(&path, &resolver).validate().unwrap();
        assert_eq!(findings.with_code(FindingCode::MissingRequiredProperty).len(), 1);
        assert!(!findings.contains(FindingCode::MissingExtendsTarget));
    }

    #[test]
    fn test_all_checks_run_together() {
        let dir = tempdir().unwrap();
        let path = write_schema(
            dir.path(),
            "bad.json",
            json!({"_type": "core:bad", "_extends": "missing.json", "required": ["a", "b"], "properties": {"a": {}}}),
        );
        let resolver = resolver(Arc::new(FakeRemote::default()), dir.path(), None);
        let findings = SchemaValidator::new(&path, &resolver).validate().unwrap();

        assert!(findings.contains(FindingCode::InvalidTypeCasing));
        assert!(findings.contains(FindingCode::MissingExtendsTarget));
        assert_eq!(findings.with_code(FindingCode::MissingRequiredProperty).len(), 1);
        assert_eq!(findings.error_count(), 3);
    }

    #[test]
    fn test_missing_schema_file_is_fatal() {
        let dir = tempdir().unwrap();
        let resolver = resolver(Arc::new(FakeRemote::default()), dir.path(), None);
        let err = SchemaValidator::new(dir.path().join("absent.json"), &resolver)
            .validate()
            .unwrap_err();
        assert!(err.is_fatal());
    }
}

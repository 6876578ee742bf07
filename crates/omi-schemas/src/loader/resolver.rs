//! `_extends` resolution for schema templates
//!
//! This module handles:
//! - Relative references, read from the local schema root
//! - Absolute references (`/<module>/<path>`), bound to a module of some
//!   version and fetched from the module's repository at its pinned commit,
//!   or at the highest version branch for `latest`
//! - Caching of remote lookups for the lifetime of one run
//! - Walking a whole `_extends` chain with cycle detection
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use crate::loader::cache::{CacheEntry, ResolutionCache};
use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::parser::{DocumentKind, DocumentParser};
use crate::sources::RemoteSource;
use crate::versioning::{VersionRegistry, LATEST};
use base64::{engine::general_purpose, Engine as _};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Key holding the parent reference in a schema template
pub const EXTENDS_KEY: &str = "_extends";

/// Repository and branch a schema under validation lives in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerRepository {
    pub repository: String,
    pub branch: String,
}

impl CallerRepository {
    /// Create a caller identity
    pub fn new(repository: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            branch: branch.into(),
        }
    }
}

/// Resolver settings
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Directory relative references are read from
    pub local_root: PathBuf,
    /// Base of the repository content API (`https://api.github.com/repos`)
    pub content_api_base: String,
    /// Repository/branch of the schema under validation, used to bind absolute references
    pub caller: Option<CallerRepository>,
    /// Maximum `_extends` chain length before the chain is treated as circular
    pub max_depth: usize,
}

impl ResolverConfig {
    /// Create a config reading relative references from `local_root`
    pub fn new(local_root: impl Into<PathBuf>) -> Self {
        Self {
            local_root: local_root.into(),
            content_api_base: "https://api.github.com/repos".to_string(),
            caller: None,
            max_depth: 32,
        }
    }

    /// Set the caller repository and branch
    pub fn with_caller(mut self, caller: CallerRepository) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Override the content API base URL
    pub fn with_content_api_base(mut self, base: impl Into<String>) -> Self {
        self.content_api_base = base.into();
        self
    }
}

/// Where a resolved schema was bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Read from the local schema root
    Local { path: PathBuf },
    /// Fetched from a module repository
    Module {
        version: String,
        module: String,
        repository: String,
        git_ref: String,
    },
}

impl Binding {
    /// Version the binding belongs to, if module bound
    pub fn version(&self) -> Option<&str> {
        match self {
            Binding::Local { .. } => None,
            Binding::Module { version, .. } => Some(version),
        }
    }
}

/// A resolved schema document and its provenance
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    /// The reference as written in `_extends`
    pub reference: String,
    /// The parsed document
    pub document: Map<String, Value>,
    /// Module/version context the document was bound to
    pub binding: Binding,
}

impl ResolvedSchema {
    /// `_extends` of this document, if any
    pub fn extends(&self) -> Option<&str> {
        self.document.get(EXTENDS_KEY).and_then(Value::as_str)
    }

    /// Whether this document defines `property` in its `properties`
    pub fn defines_property(&self, property: &str) -> bool {
        defines_property(&self.document, property)
    }
}

/// Why an `_extends` chain walk stopped
#[derive(Debug)]
pub enum ChainEnd {
    /// The last ancestor has no `_extends`
    Root,
    /// An ancestor could not be resolved
    Unresolved(LoaderError),
    /// The chain loops or exceeds the depth limit
    Circular(LoaderError),
}

/// Ancestors of a schema, nearest first
#[derive(Debug)]
pub struct ExtendsChain {
    pub ancestors: Vec<ResolvedSchema>,
    pub end: ChainEnd,
}

impl ExtendsChain {
    /// First ancestor defining `property`, if any
    pub fn defining_ancestor(&self, property: &str) -> Option<&ResolvedSchema> {
        self.ancestors.iter().find(|a| a.defines_property(property))
    }

    /// Whether the walk reached a root document
    pub fn is_terminated(&self) -> bool {
        matches!(self.end, ChainEnd::Root)
    }
}

/// Resolves `_extends` references to schema documents
pub struct SchemaResolver {
    registry: Arc<VersionRegistry>,
    remote: Arc<dyn RemoteSource>,
    cache: Arc<ResolutionCache>,
    parser: DocumentParser,
    config: ResolverConfig,
}

impl std::fmt::Debug for SchemaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaResolver")
            .field("config", &self.config)
            .field("cache", &self.cache.stats())
            .finish()
    }
}

impl SchemaResolver {
    /// Create a resolver sharing `cache` with other resolvers of the same run
    pub fn new(
        registry: Arc<VersionRegistry>,
        remote: Arc<dyn RemoteSource>,
        cache: Arc<ResolutionCache>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            registry,
            remote,
            cache,
            parser: DocumentParser::new(),
            config,
        }
    }

    /// The cache this resolver populates
    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Resolver settings
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a reference found in the schema under validation
    pub fn resolve(&self, reference: &str) -> LoaderResult<ResolvedSchema> {
        self.resolve_from(reference, None)
    }

    /// Resolve a reference on behalf of an explicit caller repository and branch
    pub fn resolve_as(
        &self,
        reference: &str,
        caller: Option<&CallerRepository>,
    ) -> LoaderResult<ResolvedSchema> {
        if reference.starts_with('/') {
            let version = self.bind_version_for(caller);
            return self.resolve_absolute(reference, &version);
        }
        self.resolve_local(reference)
    }

    /// Resolve a reference found in a document that was itself bound to `parent`
    ///
    /// Absolute references from a module-bound parent stay in the parent's
    /// version. Relative references from a module-bound parent resolve inside
    /// the parent's module.
    pub fn resolve_from(&self, reference: &str, parent: Option<&Binding>) -> LoaderResult<ResolvedSchema> {
        if reference.starts_with('/') {
            let version = match parent.and_then(Binding::version) {
                Some(version) => version.to_string(),
                None => self.bind_version_for(self.config.caller.as_ref()),
            };
            return self.resolve_absolute(reference, &version);
        }

        match parent {
            Some(Binding::Module { version, module, .. }) => {
                let absolute = format!("/{}/{}", module, reference.trim_start_matches("./"));
                let version = version.clone();
                self.resolve_absolute(&absolute, &version)
                    .map(|resolved| ResolvedSchema {
                        reference: reference.to_string(),
                        ..resolved
                    })
            }
            _ => self.resolve_local(reference),
        }
    }

    /// Walk the `_extends` chain starting at `reference`
    ///
    /// Stops at the first document without `_extends`, at the first reference
    /// that cannot be resolved, or when a reference repeats.
    pub fn resolve_chain(&self, reference: &str, parent: Option<&Binding>) -> ExtendsChain {
        let mut ancestors: Vec<ResolvedSchema> = Vec::new();
        let mut visited: Vec<String> = Vec::new();
        let mut next = Some((reference.to_string(), parent.cloned()));

        while let Some((current, from)) = next.take() {
            let key = chain_key(&current, from.as_ref());
            if visited.contains(&key) || visited.len() >= self.config.max_depth {
                visited.push(key);
                let err = LoaderError::circular_extends(&visited);
                warn!(reference = %current, "{}", err);
                return ExtendsChain {
                    ancestors,
                    end: ChainEnd::Circular(err),
                };
            }
            visited.push(key);

            match self.resolve_from(&current, from.as_ref()) {
                Ok(resolved) => {
                    next = resolved
                        .extends()
                        .map(|parent_ref| (parent_ref.to_string(), Some(resolved.binding.clone())));
                    ancestors.push(resolved);
                }
                Err(err) => {
                    debug!(reference = %current, error = %err, "Chain walk stopped at unresolved ancestor");
                    return ExtendsChain {
                        ancestors,
                        end: ChainEnd::Unresolved(err),
                    };
                }
            }
        }

        ExtendsChain {
            ancestors,
            end: ChainEnd::Root,
        }
    }

    /// Version an absolute reference from the configured caller binds to
    ///
    /// Versions are scanned in registry order; the first one with a module
    /// living at the caller's repository and branch wins. Without a match the
    /// reference binds to `latest`.
    pub fn bind_version(&self) -> String {
        self.bind_version_for(self.config.caller.as_ref())
    }

    fn bind_version_for(&self, caller: Option<&CallerRepository>) -> String {
        if let Some(caller) = caller {
            for version in self.registry.ordered_versions() {
                if version == LATEST {
                    break;
                }
                let matched = self
                    .registry
                    .modules(&version)
                    .map(|modules| {
                        modules
                            .values()
                            .any(|m| m.matches(&caller.repository, &caller.branch))
                    })
                    .unwrap_or(false);
                if matched {
                    debug!(version = %version, repository = %caller.repository, "Bound caller to version");
                    return version;
                }
            }
        }
        LATEST.to_string()
    }

    fn resolve_local(&self, reference: &str) -> LoaderResult<ResolvedSchema> {
        let path = self.config.local_root.join(reference);
        if !path.is_file() {
            return Err(LoaderError::schema_not_found(
                reference,
                path.display().to_string(),
            ));
        }

        let document = self.parser.parse_file(&path, DocumentKind::Schema)?;
        debug!(reference = %reference, path = %path.display(), "Resolved local schema");
        Ok(ResolvedSchema {
            reference: reference.to_string(),
            document,
            binding: Binding::Local { path },
        })
    }

    fn resolve_absolute(&self, reference: &str, version: &str) -> LoaderResult<ResolvedSchema> {
        let mut segments = reference.trim_start_matches('/').splitn(2, '/');
        let module_name = segments.next().unwrap_or_default();
        let content_path = segments.next().unwrap_or_default();

        let module = self
            .registry
            .module(version, module_name)
            .filter(|_| !module_name.is_empty())
            .ok_or_else(|| LoaderError::module_unresolvable(reference, module_name, version))?;

        let git_ref = match module.pinned_ref() {
            Some(pinned) if version != LATEST => pinned.to_string(),
            _ => self
                .registry
                .resolve_latest_module_reference(module, self.remote.as_ref(), &self.cache)?,
        };

        let binding = Binding::Module {
            version: version.to_string(),
            module: module_name.to_string(),
            repository: module.repository.clone(),
            git_ref: git_ref.clone(),
        };

        let cache_key = format!("{}@{}", reference, version);
        if let Some(entry) = self.cache.get(&cache_key) {
            debug!(reference = %reference, "Resolution cache hit");
            return Ok(ResolvedSchema {
                reference: reference.to_string(),
                document: entry.document,
                binding,
            });
        }

        let url = self.content_url(&module.repository, content_path, &git_ref)?;
        info!(reference = %reference, url = %url, "Fetching remote schema");

        let bytes = self
            .remote
            .fetch(&url)?
            .ok_or_else(|| LoaderError::schema_not_found(reference, url.clone()))?;
        let document = decode_content(&self.parser, &bytes).map_err(|reason| LoaderError::remote(&url, reason))?;

        self.cache
            .put(cache_key, CacheEntry::new(document.clone(), url));
        Ok(ResolvedSchema {
            reference: reference.to_string(),
            document,
            binding,
        })
    }

    /// Content API URL of `path` in `repository` at `git_ref`
    pub fn content_url(&self, repository: &str, path: &str, git_ref: &str) -> LoaderResult<String> {
        let parsed = Url::parse(repository).map_err(|e| LoaderError::remote(repository, e))?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let (owner, name) = match segments.as_slice() {
            [.., owner, name] => (*owner, name.strip_suffix(".git").unwrap_or(name)),
            _ => {
                return Err(LoaderError::remote(
                    repository,
                    "repository URL has no owner/name path",
                ))
            }
        };

        Ok(format!(
            "{}/{}/{}/contents/{}?ref={}",
            self.config.content_api_base.trim_end_matches('/'),
            owner,
            name,
            path.trim_start_matches('/'),
            git_ref
        ))
    }
}

/// Whether a schema document lists `property` under `properties`
pub fn defines_property(document: &Map<String, Value>, property: &str) -> bool {
    document
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.contains_key(property))
        .unwrap_or(false)
}

// Content API responses wrap the file as base64 under "content"; raw hosts
// return the document itself.
fn decode_content(parser: &DocumentParser, bytes: &[u8]) -> Result<Map<String, Value>, String> {
    let outer = parser.parse_bytes(bytes)?;
    let Some(encoded) = outer.get("content").and_then(Value::as_str) else {
        return Ok(outer);
    };

    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let decoded = general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| format!("invalid base64 content: {}", e))?;
    parser.parse_bytes(&decoded)
}

fn chain_key(reference: &str, parent: Option<&Binding>) -> String {
    match parent {
        Some(Binding::Module { version, module, .. }) if !reference.starts_with('/') => {
            format!("/{}/{}@{}", module, reference, version)
        }
        Some(Binding::Module { version, .. }) => format!("{}@{}", reference, version),
        _ => reference.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioning::VersionRegistry;
    use serde_json::json;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct FakeRemote {
        files: HashMap<String, Value>,
        branches: HashMap<String, Vec<String>>,
        fetched: Mutex<Vec<String>>,
    }

    impl RemoteSource for FakeRemote {
        fn fetch(&self, url: &str) -> LoaderResult<Option<Vec<u8>>> {
            self.fetched.lock().unwrap().push(url.to_string());
            Ok(self.files.get(url).map(|v| {
                let encoded = general_purpose::STANDARD.encode(v.to_string());
                json!({ "content": encoded, "encoding": "base64" }).to_string().into_bytes()
            }))
        }

        fn list_branches(&self, repository: &str) -> LoaderResult<Vec<String>> {
            Ok(self.branches.get(repository).cloned().unwrap_or_default())
        }
    }

    const CORE: &str = "https://github.com/openMetadataInitiative/openMINDS_core.git";

    fn registry() -> Arc<VersionRegistry> {
        let manifest = json!({
            "v3.0": {"namespaces": {}, "modules": {
                "core": {"repository": CORE, "branch": "v3", "commit": "c3"}
            }},
            "latest": {"namespaces": {}, "modules": {
                "core": {"repository": CORE, "branch": "main"}
            }}
        });
        Arc::new(VersionRegistry::from_slice(manifest.to_string().as_bytes()).unwrap())
    }

    fn url(path: &str, git_ref: &str) -> String {
        format!(
            "https://api.github.com/repos/openMetadataInitiative/openMINDS_core/contents/{}?ref={}",
            path, git_ref
        )
    }

    fn resolver(remote: FakeRemote, config: ResolverConfig) -> (SchemaResolver, Arc<FakeRemote>) {
        let remote = Arc::new(remote);
        let resolver = SchemaResolver::new(
            registry(),
            remote.clone(),
            Arc::new(ResolutionCache::new()),
            config,
        );
        (resolver, remote)
    }

    #[test]
    fn test_absolute_reference_binds_latest_by_default() {
        let mut remote = FakeRemote::default();
        remote.branches.insert(CORE.to_string(), vec!["main".into(), "v3".into(), "v4".into()]);
        remote.files.insert(url("schemas/x.schema.omi.json", "v4"), json!({"_type": "X"}));

        let (resolver, remote) = resolver(remote, ResolverConfig::new("/nonexistent"));
        let resolved = resolver.resolve("/core/schemas/x.schema.omi.json").unwrap();
        assert_eq!(resolved.document["_type"], "X");
        assert_eq!(resolved.binding.version(), Some("latest"));

        // second resolution is served from the cache
        resolver.resolve("/core/schemas/x.schema.omi.json").unwrap();
        assert_eq!(remote.fetched.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_caller_repository_binds_pinned_version() {
        let mut remote = FakeRemote::default();
        remote.files.insert(url("schemas/x.schema.omi.json", "c3"), json!({"_type": "X3"}));

        let config = ResolverConfig::new("/nonexistent")
            .with_caller(CallerRepository::new(CORE, "v3"));
        let (resolver, _) = resolver(remote, config);
        assert_eq!(resolver.bind_version(), "v3.0");

        let resolved = resolver.resolve("/core/schemas/x.schema.omi.json").unwrap();
        assert_eq!(resolved.document["_type"], "X3");
    }

    #[test]
    fn test_unknown_module_is_unresolvable() {
        let (resolver, _) = resolver(FakeRemote::default(), ResolverConfig::new("/nonexistent"));
        assert!(matches!(
            resolver.resolve("/sands/x.schema.omi.json"),
            Err(LoaderError::ModuleUnresolvable { .. })
        ));
    }

    #[test]
    fn test_missing_remote_file_is_not_found() {
        let mut remote = FakeRemote::default();
        remote.branches.insert(CORE.to_string(), vec!["v1".into()]);
        let (resolver, _) = resolver(remote, ResolverConfig::new("/nonexistent"));
        assert!(matches!(
            resolver.resolve("/core/missing.schema.omi.json"),
            Err(LoaderError::SchemaNotFound { .. })
        ));
    }

    #[test]
    fn test_latest_without_version_branch() {
        let mut remote = FakeRemote::default();
        remote.branches.insert(CORE.to_string(), vec!["main".into()]);
        let (resolver, _) = resolver(remote, ResolverConfig::new("/nonexistent"));
        assert!(matches!(
            resolver.resolve("/core/x.schema.omi.json"),
            Err(LoaderError::NoVersionBranch { .. })
        ));
    }

    #[test]
    fn test_local_chain_walk() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("products")).unwrap();
        fs::write(
            dir.path().join("products/dataset.schema.tpl.json"),
            r#"{"_extends": "products/researchProduct.schema.tpl.json", "properties": {"a": {}}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("products/researchProduct.schema.tpl.json"),
            r#"{"properties": {"name": {}}}"#,
        )
        .unwrap();

        let (resolver, _) = resolver(FakeRemote::default(), ResolverConfig::new(dir.path()));
        let chain = resolver.resolve_chain("products/dataset.schema.tpl.json", None);
        assert!(chain.is_terminated());
        assert_eq!(chain.ancestors.len(), 2);
        assert!(chain.defining_ancestor("name").is_some());
        assert!(chain.defining_ancestor("missing").is_none());
    }

    #[test]
    fn test_circular_chain_is_detected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"{"_extends": "b.json"}"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"{"_extends": "a.json"}"#).unwrap();

        let (resolver, _) = resolver(FakeRemote::default(), ResolverConfig::new(dir.path()));
        let chain = resolver.resolve_chain("a.json", None);
        assert!(matches!(chain.end, ChainEnd::Circular(LoaderError::CircularExtends { .. })));
        assert_eq!(chain.ancestors.len(), 2);
    }

    #[test]
    fn test_content_url_from_repository() {
        let (resolver, _) = resolver(FakeRemote::default(), ResolverConfig::new("/nonexistent"));
        assert_eq!(
            resolver.content_url(CORE, "/schemas/x.json", "abc").unwrap(),
            url("schemas/x.json", "abc")
        );
        assert!(resolver.content_url("not a url", "x", "y").is_err());
    }

    #[test]
    fn test_raw_documents_are_accepted() {
        let parser = DocumentParser::new();
        let doc = decode_content(&parser, br#"{"_type": "Raw"}"#).unwrap();
        assert_eq!(doc["_type"], "Raw");
    }
}

//! Instance command handler

use super::utils;
use crate::cli::InstanceArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use omi_schemas::sources::{LocalClassDirectory, SourceCheckout};
use omi_schemas::{DocumentReport, InstanceValidator};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Handle the instance command
///
/// Every file is validated independently against one shared catalog,
/// registry and class directory; a fatal error stops only its own document.
#[instrument(skip_all, fields(files = args.instances.len()))]
pub fn handle_instance(args: InstanceArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("instance_command", &format!("{} file(s)", args.instances.len()));

    let remote = utils::remote(config)?;
    let manifests = utils::manifests(config, &remote, args.offline)?;
    let registry = manifests.registry()?;
    let catalog = manifests.catalog()?;
    let (types, properties) = catalog.counts();
    info!(types, properties, "Vocabulary loaded");

    let sources_dir = &config.paths.sources_dir;
    if !args.offline {
        let checkout = SourceCheckout::new(&config.sources.central_repository)
            .with_timeout(Duration::from_secs(config.remote.clone_timeout));
        if let Err(err) = checkout.materialize(sources_dir, args.refetch) {
            warn!(error = %err, "Class definitions unavailable, presence checks will be skipped");
            output.warning(&format!("Could not fetch class definitions: {}", err))?;
        }
    }
    let classes = LocalClassDirectory::new(sources_dir);

    let progress = output.progress_bar(args.instances.len() as u64, "validating instances");
    let mut reports = Vec::with_capacity(args.instances.len());
    for path in &args.instances {
        output.info(&format!("Validating instance: {}", path.display()))?;

        let mut validator = InstanceValidator::new(path, &catalog, &registry, &classes);
        if let Some(version) = &args.schema_version {
            validator = validator.with_version(version);
        }
        reports.push(DocumentReport::run(path, &validator));

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    utils::finish(&reports, output)
}

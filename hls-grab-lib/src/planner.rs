//! Planner entry point
//!
//! Runs one request through locator, fetch, analyzer, selection policy and
//! plan builder, and names the output file. Everything here is synchronous;
//! the only I/O is the manifest fetch, done by the injected [`ManifestFetch`].

use serde::Serialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::config::PlannerConfig;
use crate::descriptor::{AssetDescriptor, PackageType};
use crate::engine;
use crate::error::Result;
use crate::headers::RequestHeaders;
use crate::locator::{self, ResolvedManifestUrl};
use crate::naming::{NamingOverrides, OutputNamingContext};
use crate::plan::{PlanBuilder, RemuxPlan};
use crate::playlist::{self, PlaylistKind, PlaylistModel};
use crate::preferences::Preferences;
use crate::selection::{self, SelectionDecision};

/// Fetches manifest text.
///
/// Failures are reported as [`crate::GrabError::ManifestFetch`]; the planner
/// never retries.
pub trait ManifestFetch {
    fn fetch(&self, url: &Url, headers: &RequestHeaders) -> Result<String>;
}

/// One download request
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub descriptor: AssetDescriptor,
    pub preferences: Preferences,
    pub headers: RequestHeaders,
    pub naming: NamingOverrides,
}

/// Everything needed to run the engine for one request
#[derive(Debug, Clone, Serialize)]
pub struct PlannedJob {
    pub manifest_url: String,
    /// Present when a master playlist was analyzed
    pub playlist: Option<PlaylistModel>,
    pub decision: SelectionDecision,
    pub file_name: String,
    pub plan: RemuxPlan,
}

impl PlannedJob {
    pub fn output_path(&self) -> &Path {
        self.plan.output_path()
    }
}

pub struct Planner {
    config: PlannerConfig,
    builder: PlanBuilder,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        let builder = PlanBuilder::new(&config);
        Self { config, builder }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Engine binary per this planner's configuration.
    pub fn engine_binary(&self) -> Option<PathBuf> {
        engine::locate_engine(&self.config)
    }

    /// Plan one request, writing into `output_dir`.
    pub fn plan(
        &self,
        request: &PlanRequest,
        fetcher: &dyn ManifestFetch,
        output_dir: &Path,
    ) -> Result<PlannedJob> {
        let descriptor = &request.descriptor;
        let manifest_url = locator::resolve(descriptor)?;
        tracing::debug!(
            "manifest {} ({})",
            manifest_url,
            descriptor.package_type
        );

        let mut prefs = request.preferences.clone();
        prefs.disable_variant_selection |= self.config.disable_variant_selection;

        let (playlist, decision) = match descriptor.package_type {
            PackageType::Hls => {
                self.select_hls(&manifest_url, &prefs, &request.headers, fetcher)?
            }
            PackageType::Dash => (
                None,
                selection::select_passthrough(manifest_url.as_str(), &prefs, PackageType::Dash),
            ),
        };

        let file_name =
            OutputNamingContext::new(&request.naming, &descriptor.metadata, prefs.container)
                .derive();
        let plan = self
            .builder
            .build(&decision, &request.headers, &output_dir.join(&file_name));
        tracing::debug!("engine args: {}", plan.redacted());

        Ok(PlannedJob {
            manifest_url: manifest_url.to_string(),
            playlist,
            decision,
            file_name,
            plan,
        })
    }

    fn select_hls(
        &self,
        manifest_url: &ResolvedManifestUrl,
        prefs: &Preferences,
        headers: &RequestHeaders,
        fetcher: &dyn ManifestFetch,
    ) -> Result<(Option<PlaylistModel>, SelectionDecision)> {
        let text = fetcher.fetch(manifest_url.as_url(), headers)?;

        if playlist::classify(&text) == PlaylistKind::Media {
            tracing::debug!("{} is a media playlist, using it as input", manifest_url);
            let decision =
                selection::select_passthrough(manifest_url.as_str(), prefs, PackageType::Hls);
            return Ok((None, decision));
        }

        let model = playlist::analyze(&text, manifest_url.as_url())?;
        let decision = selection::select(&model, prefs);
        Ok((Some(model), decision))
    }
}

//! Reconciliation of local installs against the market.
//!
//! Every batch operation processes its items independently: one item's
//! failure is recorded in its [`ItemReport`] and the batch continues.

use crate::context::Context;
use llpm_core::version::is_less;
use llpm_core::{Error, Manifest, Result, Slug, SlugSpec};
use serde::Serialize;
use tracing::{debug, info};

/// Successful (or deliberately skipped) result of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Plugin downloaded and extracted
    Installed {
        /// Installed version label
        version: String,
        /// Downloaded archive size
        bytes: u64,
        /// Whether `manifest.json` ended up at the top level
        manifest_found: bool,
    },
    /// Plugin removed and reinstalled at a newer (or the same, forced) version
    Upgraded {
        /// Version before the upgrade
        from: String,
        /// Version after the upgrade
        to: String,
        /// Downloaded archive size
        bytes: u64,
        /// Whether `manifest.json` ended up at the top level
        manifest_found: bool,
    },
    /// Plugin directory deleted
    Removed {
        /// Version that was removed
        version: String,
    },
    /// The user declined the confirmation
    Cancelled,
}

/// Result of one item in a batch.
#[derive(Debug)]
pub struct ItemReport {
    /// Slug the item refers to
    pub slug: Slug,
    /// What happened
    pub result: Result<Outcome>,
    /// Follow-up suggestion for the user
    pub hint: Option<String>,
}

impl ItemReport {
    const fn done(slug: Slug, outcome: Outcome) -> Self {
        Self {
            slug,
            result: Ok(outcome),
            hint: None,
        }
    }

    fn failed(slug: Slug, err: Error) -> Self {
        let hint = err.remediation();
        Self {
            slug,
            result: Err(err),
            hint,
        }
    }

    fn from_result(slug: Slug, result: Result<Outcome>) -> Self {
        match result {
            Ok(outcome) => Self::done(slug, outcome),
            Err(e) => Self::failed(slug, e),
        }
    }

    /// Returns `true` unless the item failed for a reason other than being
    /// up to date.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.as_ref().map_or_else(Error::is_up_to_date, |_| true)
    }
}

/// An installed plugin with a newer market version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedUpgrade {
    /// Plugin slug
    pub slug: Slug,
    /// Display name
    pub name: String,
    /// Installed version
    pub from: String,
    /// Market version
    pub to: String,
}

/// Installs each requested plugin from the market.
///
/// A plugin already installed at the target version is reported as
/// [`Error::AlreadyUpToDate`]. A `@version` pin is only accepted for
/// release-based plugins.
pub async fn add(ctx: &mut Context, specs: &[SlugSpec]) -> Vec<ItemReport> {
    let mut reports = Vec::with_capacity(specs.len());
    for spec in specs {
        let result = add_one(ctx, spec).await;
        reports.push(ItemReport::from_result(spec.slug.clone(), result));
        refresh_after_mutation(ctx);
    }
    reports
}

async fn add_one(ctx: &Context, spec: &SlugSpec) -> Result<Outcome> {
    let manifest = ctx
        .remote
        .get(&spec.slug)
        .ok_or_else(|| Error::PluginNotFound {
            slug: spec.slug.to_string(),
        })?;

    let pin = spec.version.as_deref();
    if pin.is_some() && !manifest.is_release_based() {
        return Err(Error::UnsupportedOperation {
            reason: format!(
                "{} is installed from source archives; versions cannot be pinned",
                spec.slug
            ),
        });
    }

    let target = pin.map_or_else(
        || manifest.version.clone(),
        |v| v.trim_start_matches('v').to_string(),
    );
    if let Some(local) = ctx.local.get(&spec.slug)
        && local.version == target
    {
        return Err(Error::AlreadyUpToDate {
            slug: spec.slug.to_string(),
            version: target,
        });
    }

    let outcome = ctx.store.install(manifest, pin, ctx.source()).await?;
    debug!("Fetched {} ({} bytes)", outcome.url, outcome.bytes);
    Ok(Outcome::Installed {
        version: outcome.version,
        bytes: outcome.bytes,
        manifest_found: outcome.manifest_found,
    })
}

/// Lists installed plugins whose market version is strictly newer.
///
/// Plugins missing from the market, or with versions that do not parse,
/// are left out.
#[must_use]
pub fn plan_upgrades(ctx: &Context) -> Vec<PlannedUpgrade> {
    ctx.local
        .iter()
        .filter_map(|(slug, local)| {
            let remote = ctx.remote.get(slug)?;
            match is_less(&local.version, &remote.version) {
                Ok(true) => Some(PlannedUpgrade {
                    slug: slug.clone(),
                    name: local.name.clone(),
                    from: local.version.clone(),
                    to: remote.version.clone(),
                }),
                Ok(false) => None,
                Err(e) => {
                    debug!("Skipping {} in upgrade plan: {}", slug, e);
                    None
                }
            }
        })
        .collect()
}

/// Confirmation prompt for a bulk upgrade.
#[must_use]
pub fn upgrade_prompt(plan: &[PlannedUpgrade]) -> String {
    format!("Upgrade {} outdated plugin(s)?", plan.len())
}

/// Upgrades installed plugins.
///
/// With `slugs`, each named plugin is upgraded if the market version is
/// newer, or unconditionally with `force`. Without `slugs`, every outdated
/// plugin is upgraded after one confirmation; `force` is rejected in that
/// mode. A non-empty bulk plan is handed to `on_plan` before confirming,
/// so it is presented even when the answer is fixed.
///
/// # Errors
///
/// Returns [`Error::UnsupportedOperation`] for `force` without slugs, or
/// the confirmation failure. Per-plugin failures are in the reports.
pub async fn upgrade(
    ctx: &mut Context,
    slugs: &[Slug],
    force: bool,
    on_plan: impl FnOnce(&[PlannedUpgrade]),
) -> Result<Vec<ItemReport>> {
    if !slugs.is_empty() {
        let mut reports = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let result = upgrade_one(ctx, slug, force).await;
            reports.push(ItemReport::from_result(slug.clone(), result));
            refresh_after_mutation(ctx);
        }
        return Ok(reports);
    }

    if force {
        return Err(Error::UnsupportedOperation {
            reason: "--force needs explicit plugin slugs".to_string(),
        });
    }

    let plan = plan_upgrades(ctx);
    if plan.is_empty() {
        info!("All plugins are up to date");
        return Ok(Vec::new());
    }

    on_plan(&plan);
    if !ctx.confirm(&upgrade_prompt(&plan))? {
        return Ok(plan
            .into_iter()
            .map(|item| ItemReport::done(item.slug, Outcome::Cancelled))
            .collect());
    }

    let mut reports = Vec::with_capacity(plan.len());
    for item in plan {
        let result = upgrade_one(ctx, &item.slug, false).await;
        reports.push(ItemReport::from_result(item.slug, result));
        refresh_after_mutation(ctx);
    }
    Ok(reports)
}

async fn upgrade_one(ctx: &Context, slug: &Slug, force: bool) -> Result<Outcome> {
    let local = ctx.local.get(slug).ok_or_else(|| Error::NotInstalled {
        slug: slug.to_string(),
    })?;
    let remote = ctx.remote.get(slug).ok_or_else(|| Error::PluginNotFound {
        slug: slug.to_string(),
    })?;

    if !force && !is_less(&local.version, &remote.version)? {
        return Err(Error::AlreadyUpToDate {
            slug: slug.to_string(),
            version: local.version.clone(),
        });
    }

    info!("Upgrading {} from {} to {}", slug, local.version, remote.version);
    ctx.store.remove(local)?;
    let outcome = ctx
        .store
        .install(remote, None, ctx.source())
        .await
        .map_err(|e| Error::ReinstallFailed {
            slug: slug.to_string(),
            source: Box::new(e),
        })?;
    debug!("Fetched {} ({} bytes)", outcome.url, outcome.bytes);

    Ok(Outcome::Upgraded {
        from: local.version.clone(),
        to: outcome.version,
        bytes: outcome.bytes,
        manifest_found: outcome.manifest_found,
    })
}

/// Removes each named plugin after confirmation.
///
/// With `force`, a directory the local scan does not know is removed
/// under a placeholder manifest.
pub fn remove(ctx: &mut Context, slugs: &[Slug], force: bool) -> Vec<ItemReport> {
    let mut reports = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let report = remove_one(ctx, slug, force);
        reports.push(report);
        refresh_after_mutation(ctx);
    }
    reports
}

fn remove_one(ctx: &Context, slug: &Slug, force: bool) -> ItemReport {
    let manifest = match ctx.local.get(slug) {
        Some(manifest) => manifest.clone(),
        None if force => Manifest::placeholder(slug.clone()),
        None => {
            let mut report = ItemReport::failed(
                slug.clone(),
                Error::NotInstalled {
                    slug: slug.to_string(),
                },
            );
            if ctx.store.exists(slug) {
                report.hint = Some(format!(
                    "a directory named '{slug}' exists but has no matching manifest; \
                     run `llpm audit --fix` or `llpm remove {slug} --force`"
                ));
            }
            return report;
        }
    };

    let prompt = format!("Remove plugin {}?", manifest.display_name());
    let result = ctx.confirm(&prompt).and_then(|confirmed| {
        if !confirmed {
            return Ok(Outcome::Cancelled);
        }
        ctx.store.remove(&manifest)?;
        Ok(Outcome::Removed {
            version: manifest.version.clone(),
        })
    });
    ItemReport::from_result(slug.clone(), result)
}

fn refresh_after_mutation(ctx: &mut Context) {
    if let Err(e) = ctx.refresh_local() {
        tracing::warn!("Could not rescan plugins directory: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_prompt_counts_plan() {
        let plan = vec![PlannedUpgrade {
            slug: Slug::new("demo").unwrap(),
            name: "Demo".to_string(),
            from: "1.0.0".to_string(),
            to: "1.2.0".to_string(),
        }];
        assert_eq!(upgrade_prompt(&plan), "Upgrade 1 outdated plugin(s)?");
    }

    #[test]
    fn test_report_is_ok() {
        let slug = Slug::new("demo").unwrap();
        assert!(ItemReport::done(slug.clone(), Outcome::Cancelled).is_ok());
        assert!(
            ItemReport::failed(
                slug.clone(),
                Error::AlreadyUpToDate {
                    slug: "demo".to_string(),
                    version: "1.0.0".to_string(),
                }
            )
            .is_ok()
        );
        let failed = ItemReport::failed(
            slug,
            Error::PluginNotFound {
                slug: "demo".to_string(),
            },
        );
        assert!(!failed.is_ok());
        assert!(failed.hint.unwrap().contains("llpm update"));
    }
}

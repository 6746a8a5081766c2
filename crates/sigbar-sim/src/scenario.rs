use std::fs;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use sigbar_core::catalog::IconGroupKind;
use sigbar_core::config::SignalConfigInput;
use sigbar_core::{IconSelection, MobileSignalController, SubscriptionInfo, TelephonyEvent};
use tracing::{debug, info};

/// A scripted telemetry sequence with optional checkpoints.
///
/// ```toml
/// name = "lte handover"
///
/// [config]
/// show_4g_for_lte = true
///
/// [[steps]]
/// event = "service_state"
/// voice_reg_state = "in_service"
/// data_rat = "lte"
///
/// [[expect]]
/// icon_group = "four_g"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub config: SignalConfigInput,
    pub subscription: SubscriptionInfo,
    pub steps: Vec<TelephonyEvent>,
    pub expect: Vec<Expectation>,
}

/// Fields checked against the selection in effect after a step.
///
/// Unset fields are not checked. `after_step` defaults to the last step.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Expectation {
    pub after_step: Option<usize>,
    pub icon_group: Option<IconGroupKind>,
    pub status_bar_icon: Option<String>,
    pub data_type_overlay: Option<String>,
    pub network_name: Option<String>,
    pub network_name_data: Option<String>,
    pub published: Option<bool>,
}

/// Result of applying one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub event: &'static str,
    pub published: bool,
    /// `None` when the selection could not be derived (invalid slot).
    pub selection: Option<IconSelection>,
}

#[derive(Debug, Clone)]
pub struct Replay {
    pub name: String,
    pub outcomes: Vec<StepOutcome>,
    pub published: u64,
    pub skipped: u64,
}

impl Replay {
    /// Steps that produced a listener notification.
    pub fn published_steps(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| o.published)
    }

    pub fn final_selection(&self) -> Option<&IconSelection> {
        self.outcomes.last().and_then(|o| o.selection.as_ref())
    }
}

impl Scenario {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).context("invalid scenario TOML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        let mut scenario = Self::from_toml_str(&text)
            .with_context(|| format!("failed to parse scenario {}", path.display()))?;
        if scenario.name.is_empty() {
            scenario.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(scenario)
    }

    /// Feeds every step through a fresh controller.
    pub fn run(&self) -> Result<Replay> {
        let config = self
            .config
            .clone()
            .resolve()
            .context("invalid [config] table")?;
        let mut controller = MobileSignalController::spawn(config, self.subscription.clone())
            .context("failed to start change notifier")?;

        let mut outcomes = Vec::with_capacity(self.steps.len());
        for (step, event) in self.steps.iter().cloned().enumerate() {
            let kind = event.kind();
            let published = controller
                .handle(event)
                .with_context(|| format!("step {step} ({kind}) failed"))?;
            let selection = controller.engine().derive().ok();
            debug!(step, kind, published, "scenario step");
            outcomes.push(StepOutcome {
                step,
                event: kind,
                published,
                selection,
            });
        }

        info!(
            scenario = %self.name,
            steps = outcomes.len(),
            published = controller.published(),
            skipped = controller.skipped(),
            "scenario replayed"
        );
        Ok(Replay {
            name: self.name.clone(),
            outcomes,
            published: controller.published(),
            skipped: controller.skipped(),
        })
    }

    /// Checks every `[[expect]]` entry against a replay of this scenario.
    pub fn verify(&self, replay: &Replay) -> Result<()> {
        for (idx, expect) in self.expect.iter().enumerate() {
            let step = match expect.after_step {
                Some(step) => step,
                None if replay.outcomes.is_empty() => {
                    bail!("expectation {idx}: scenario has no steps")
                }
                None => replay.outcomes.len() - 1,
            };
            let outcome = replay
                .outcomes
                .get(step)
                .with_context(|| format!("expectation {idx}: no step {step}"))?;
            expect
                .check(outcome)
                .with_context(|| format!("{}: expectation {idx} after step {step}", self.name))?;
        }
        Ok(())
    }
}

impl Expectation {
    fn check(&self, outcome: &StepOutcome) -> Result<()> {
        if let Some(published) = self.published {
            ensure!(
                outcome.published == published,
                "published = {}, expected {published}",
                outcome.published
            );
        }
        let sel = outcome
            .selection
            .as_ref()
            .context("no selection could be derived")?;
        if let Some(group) = self.icon_group {
            ensure!(sel.icon_group == group, "icon group {:?}, expected {group:?}", sel.icon_group);
        }
        if let Some(icon) = &self.status_bar_icon {
            ensure!(
                sel.status_bar_icon.as_str() == icon,
                "status bar icon {}, expected {icon}",
                sel.status_bar_icon
            );
        }
        if let Some(overlay) = &self.data_type_overlay {
            let actual = sel.data_type_overlay.map(|i| i.as_str()).unwrap_or("");
            ensure!(actual == overlay, "data type overlay {actual:?}, expected {overlay:?}");
        }
        if let Some(name) = &self.network_name {
            ensure!(
                &sel.network_name == name,
                "network name {:?}, expected {name:?}",
                sel.network_name
            );
        }
        if let Some(name) = &self.network_name_data {
            ensure!(
                &sel.network_name_data == name,
                "data network name {:?}, expected {name:?}",
                sel.network_name_data
            );
        }
        Ok(())
    }
}

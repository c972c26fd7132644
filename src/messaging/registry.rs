//! Registry of provider-issued template ids

use super::templates;
use super::MessagingService;
use crate::journey::Scene;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Scene → content template id, filled in by setup and kept for the
/// lifetime of the process
#[derive(Default)]
pub struct TemplateRegistry {
    sids: RwLock<HashMap<Scene, String>>,
}

/// What happened during `provision`
#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub created: Vec<(Scene, String)>,
    pub failed: Vec<Scene>,
}

impl ProvisionReport {
    pub fn all_failed(&self) -> bool {
        self.created.is_empty() && !self.failed.is_empty()
    }
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, scene: Scene) -> Option<String> {
        self.sids.read().await.get(&scene).cloned()
    }

    pub async fn record(&self, scene: Scene, sid: impl Into<String>) {
        self.sids.write().await.insert(scene, sid.into());
    }

    /// Every scene keyed by its JSON name, `None` where no template exists
    pub async fn snapshot(&self) -> BTreeMap<&'static str, Option<String>> {
        let sids = self.sids.read().await;
        Scene::ALL
            .into_iter()
            .map(|scene| (scene.key(), sids.get(&scene).cloned()))
            .collect()
    }

    /// Create every scene's template with the provider and record the ids.
    /// A failing scene is logged and skipped; the rest still get created.
    pub async fn provision(&self, messenger: &dyn MessagingService) -> ProvisionReport {
        let mut report = ProvisionReport::default();

        for scene in Scene::ALL {
            let template = templates::template(scene);
            match messenger.create_content(&template).await {
                Ok(sid) => {
                    tracing::info!(
                        scene = %scene,
                        friendly_name = %template.friendly_name,
                        sid = %sid,
                        "Content template created"
                    );
                    self.record(scene, sid.clone()).await;
                    report.created.push((scene, sid));
                }
                Err(e) => {
                    tracing::error!(
                        scene = %scene,
                        error = %e,
                        kind = e.kind.as_str(),
                        "Failed to create content template"
                    );
                    report.failed.push(scene);
                }
            }
        }

        report
    }
}

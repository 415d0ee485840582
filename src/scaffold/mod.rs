//! Test-case skeleton generation

mod template;

pub use template::Template;

use serde::{Deserialize, Serialize};

const SCENARIO_TEMPLATE: &str = r#"<?php
{{use}}
$I = new {{actor}}($scenario);
$I->wantTo('perform actions and see result');
"#;

/// Settings for a generated scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorSettings {
    /// Class driving the scenario, e.g. `AcceptanceTester`
    pub actor: String,
    /// Namespace the actor lives in, e.g. `App\Acceptance`
    #[serde(default)]
    pub namespace: Option<String>,
}

impl ActorSettings {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            namespace: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// Renders a scenario skeleton for one actor
#[derive(Debug, Clone)]
pub struct ActorScaffold {
    settings: ActorSettings,
}

impl ActorScaffold {
    pub fn new(settings: ActorSettings) -> Self {
        Self { settings }
    }

    /// `use <namespace>\<actor>;` or an empty string without a namespace
    pub fn import_line(&self) -> String {
        match self.settings.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => {
                format!("use {}\\{};", ns.trim_end_matches('\\'), self.settings.actor)
            }
            _ => String::new(),
        }
    }

    pub fn produce(&self) -> String {
        Template::new(SCENARIO_TEMPLATE)
            .place("actor", self.settings.actor.as_str())
            .place("use", self.import_line())
            .produce()
    }
}

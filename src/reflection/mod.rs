//! Read-only introspection of a configured machine.
//!
//! [`StateMachine::info`] captures the configuration as plain data: states,
//! hierarchy, initial transitions, behaviours with their guard descriptions
//! and the actions attached to each state. Identities are rendered with
//! their `Debug` representation so the model is serialisable regardless of
//! the identity types.

use crate::behaviour::{BehaviourKind, EntryAction, TriggerBehaviour};
use crate::core::{name_of, State, Trigger};
use crate::graph::StateNode;
use crate::machine::StateMachine;
use serde::{Deserialize, Serialize};

/// Snapshot of a machine's configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateMachineInfo {
    pub current_state: String,
    pub states: Vec<StateInfo>,
    pub trigger_parameters: Vec<TriggerParametersInfo>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateInfo {
    pub name: String,
    pub superstate: Option<String>,
    pub substates: Vec<String>,
    pub initial_transition: Option<String>,
    pub behaviours: Vec<BehaviourInfo>,
    pub entry_actions: Vec<ActionInfo>,
    pub exit_actions: Vec<ActionInfo>,
    pub activate_actions: Vec<ActionInfo>,
    pub deactivate_actions: Vec<ActionInfo>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviourKindInfo {
    Transitioning,
    Reentry,
    Internal,
    Ignored,
    Dynamic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BehaviourInfo {
    pub trigger: String,
    pub kind: BehaviourKindInfo,
    /// Destination known at configuration time.
    pub destination: Option<String>,
    pub guards: Vec<String>,
    /// Documented candidates of a dynamic transition.
    pub possible_destinations: Vec<DestinationInfo>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DestinationInfo {
    pub destination: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionInfo {
    /// Trigger an entry action is restricted to.
    pub from_trigger: Option<String>,
    pub asynchronous: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerParametersInfo {
    pub trigger: String,
    pub parameters: Vec<String>,
}

impl StateMachineInfo {
    /// Pretty-printed JSON rendering.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn state(&self, name: &str) -> Option<&StateInfo> {
        self.states.iter().find(|s| s.name == name)
    }
}

impl<S: State, T: Trigger> StateMachine<S, T> {
    /// Describe the machine's configuration.
    pub fn info(&self) -> StateMachineInfo {
        let mut trigger_parameters: Vec<TriggerParametersInfo> = self
            .trigger_parameters()
            .iter()
            .map(|(trigger, types)| TriggerParametersInfo {
                trigger: name_of(trigger),
                parameters: types.iter().map(|t| t.name().to_string()).collect(),
            })
            .collect();
        trigger_parameters.sort_by(|a, b| a.trigger.cmp(&b.trigger));

        StateMachineInfo {
            current_state: name_of(&self.state()),
            states: self.graph().nodes().map(state_info).collect(),
            trigger_parameters,
        }
    }
}

fn state_info<S: State, T: Trigger>(node: &StateNode<S, T>) -> StateInfo {
    let plain = |asynchronous: bool| ActionInfo {
        from_trigger: None,
        asynchronous,
    };

    StateInfo {
        name: name_of(node.state()),
        superstate: node.superstate().map(name_of),
        substates: node.substates().iter().map(name_of).collect(),
        initial_transition: node.initial_transition().map(name_of),
        behaviours: node.behaviours().iter().map(behaviour_info).collect(),
        entry_actions: node.entry_actions().iter().map(entry_info).collect(),
        exit_actions: node.exit_actions().iter().map(|a| plain(a.is_async())).collect(),
        activate_actions: node.activate_actions().iter().map(|a| plain(a.is_async())).collect(),
        deactivate_actions: node
            .deactivate_actions()
            .iter()
            .map(|a| plain(a.is_async()))
            .collect(),
    }
}

fn entry_info<S: State, T: Trigger>(entry: &EntryAction<S, T>) -> ActionInfo {
    ActionInfo {
        from_trigger: entry.trigger().map(name_of),
        asynchronous: entry.action().is_async(),
    }
}

fn behaviour_info<S: State, T: Trigger>(behaviour: &TriggerBehaviour<S, T>) -> BehaviourInfo {
    let kind = match behaviour.kind() {
        BehaviourKind::Transitioning { .. } => BehaviourKindInfo::Transitioning,
        BehaviourKind::Reentry { .. } => BehaviourKindInfo::Reentry,
        BehaviourKind::Internal { .. } => BehaviourKindInfo::Internal,
        BehaviourKind::Ignored => BehaviourKindInfo::Ignored,
        BehaviourKind::Dynamic(_) => BehaviourKindInfo::Dynamic,
    };

    let possible_destinations = match behaviour.kind() {
        BehaviourKind::Dynamic(dynamic) => dynamic
            .hints()
            .iter()
            .map(|hint| DestinationInfo {
                destination: name_of(&hint.destination),
                description: hint.description.clone(),
            })
            .collect(),
        _ => Vec::new(),
    };

    BehaviourInfo {
        trigger: name_of(behaviour.trigger()),
        kind,
        destination: behaviour.kind().static_destination().map(name_of),
        guards: behaviour.guard().descriptions(),
        possible_destinations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviour::DynamicDestination;
    use crate::core::Guard;
    use crate::parameters::ParamType;
    use stillwater::prelude::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Stage {
        Draft,
        Review,
        Approved,
        Rejected,
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Step {
        Submit,
        Decide,
        Comment,
    }

    fn machine() -> StateMachine<Stage, Step> {
        let mut machine = StateMachine::new(Stage::Draft);
        machine
            .set_trigger_parameters(Step::Decide, vec![ParamType::of::<bool>()])
            .unwrap();
        machine
            .configure(Stage::Draft)
            .permit_if(Step::Submit, Stage::Review, Guard::described("has content", |_| true))
            .unwrap()
            .on_exit(|_| {});
        machine
            .configure(Stage::Review)
            .permit_dynamic(
                Step::Decide,
                DynamicDestination::new(|args| {
                    if args.get::<bool>(0).copied().unwrap_or(false) {
                        Stage::Approved
                    } else {
                        Stage::Rejected
                    }
                })
                .possible(Stage::Approved, "accepted")
                .possible(Stage::Rejected, "declined"),
            )
            .internal_transition(Step::Comment, |_| {})
            .on_entry_from_async(Step::Submit, |_| pure(()).boxed());
        machine.configure(Stage::Approved).substate_of(Stage::Review).unwrap();
        machine
    }

    #[test]
    fn states_are_listed_in_configuration_order() {
        let info = machine().info();
        let names: Vec<_> = info.states.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Draft", "Review", "Approved"]);
        assert_eq!(info.current_state, "Draft");
    }

    #[test]
    fn behaviours_carry_kind_destination_and_guards() {
        let info = machine().info();
        let draft = info.state("Draft").unwrap();

        assert_eq!(draft.behaviours.len(), 1);
        assert_eq!(draft.behaviours[0].kind, BehaviourKindInfo::Transitioning);
        assert_eq!(draft.behaviours[0].destination.as_deref(), Some("Review"));
        assert_eq!(draft.behaviours[0].guards, vec!["has content".to_string()]);
        assert_eq!(draft.exit_actions.len(), 1);
    }

    #[test]
    fn dynamic_hints_and_entry_filters_are_reported() {
        let info = machine().info();
        let review = info.state("Review").unwrap();

        let decide = &review.behaviours[0];
        assert_eq!(decide.kind, BehaviourKindInfo::Dynamic);
        assert_eq!(decide.destination, None);
        assert_eq!(decide.possible_destinations.len(), 2);
        assert_eq!(decide.possible_destinations[1].description, "declined");

        assert_eq!(review.behaviours[1].kind, BehaviourKindInfo::Internal);
        assert_eq!(
            review.entry_actions,
            vec![ActionInfo {
                from_trigger: Some("Submit".to_string()),
                asynchronous: true,
            }]
        );
        assert_eq!(review.substates, vec!["Approved".to_string()]);
    }

    #[test]
    fn trigger_parameters_are_reported() {
        let info = machine().info();
        assert_eq!(info.trigger_parameters.len(), 1);
        assert_eq!(info.trigger_parameters[0].trigger, "Decide");
        assert_eq!(info.trigger_parameters[0].parameters, vec!["bool".to_string()]);
    }

    #[test]
    fn json_rendering_can_be_read_back() {
        let info = machine().info();
        let json = info.to_json().unwrap();

        assert!(json.contains("\"kind\": \"dynamic\""));
        assert_eq!(StateMachineInfo::from_json(&json).unwrap(), info);
    }
}

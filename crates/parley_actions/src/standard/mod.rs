//! The standard library of actions and chains.
//!
//! Action ids come from [`parley_grammar::stdlib::actions`] so grammar rules
//! and actions always agree.

mod closing;
mod dropping;
mod examining;
mod going;
mod inventory;
mod locking;
mod opening;
mod putting;
mod revealed;
mod taking;
mod unlocking;

pub use closing::ClosingAction;
pub use dropping::DroppingAction;
pub use examining::ExaminingAction;
pub use going::GoingAction;
pub use inventory::InventoryAction;
pub use locking::LockingAction;
pub use opening::OpeningAction;
pub use putting::PuttingAction;
pub use revealed::{OPENED_REVEALED_CHAIN, opened_revealed};
pub use taking::TakingAction;
pub use unlocking::UnlockingAction;

use crate::action::ActionRegistry;
use crate::chain::{ChainOptions, ChainRegistry};

/// Event types emitted by the standard actions.
pub mod events {
    /// Something was opened.
    pub const OPENED: &str = "if.event.opened";
    /// Contents became visible.
    pub const REVEALED: &str = "if.event.revealed";
    /// Something was closed.
    pub const CLOSED: &str = "if.event.closed";
    /// Something was locked.
    pub const LOCKED: &str = "if.event.locked";
    /// Something was unlocked.
    pub const UNLOCKED: &str = "if.event.unlocked";
    /// Something was picked up.
    pub const TAKEN: &str = "if.event.taken";
    /// Something was put down.
    pub const DROPPED: &str = "if.event.dropped";
    /// Something was put inside a container.
    pub const PUT_IN: &str = "if.event.put_in";
    /// Something was put on a supporter.
    pub const PUT_ON: &str = "if.event.put_on";
    /// Something was looked at.
    pub const EXAMINED: &str = "if.event.examined";
    /// The actor looked around.
    pub const LOOKED: &str = "if.event.looked";
    /// The actor checked their inventory.
    pub const INVENTORY: &str = "if.event.inventory";
    /// The actor moved to another room.
    pub const WENT: &str = "if.event.went";
}

/// Registers every standard action.
pub fn register_standard_actions(registry: &mut ActionRegistry) {
    registry.register(OpeningAction);
    registry.register(ClosingAction);
    registry.register(LockingAction);
    registry.register(UnlockingAction);
    registry.register(TakingAction);
    registry.register(DroppingAction);
    registry.register(PuttingAction);
    registry.register(ExaminingAction);
    registry.register(InventoryAction);
    registry.register(GoingAction);
}

/// Registers the standard chains.
pub fn register_standard_chains(chains: &mut ChainRegistry) {
    chains.chain_event(
        events::OPENED,
        opened_revealed,
        ChainOptions::new(OPENED_REVEALED_CHAIN),
    );
}

/// Comma-joined names, or `"nothing"`.
pub(crate) fn list_names(names: &[String]) -> String {
    if names.is_empty() {
        "nothing".to_string()
    } else {
        names.join(", ")
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use parley_grammar::stdlib::actions;

    #[test]
    fn registers_every_standard_action() {
        let mut registry = ActionRegistry::new();
        register_standard_actions(&mut registry);
        assert_eq!(registry.len(), 10);
        for id in [
            actions::OPENING,
            actions::CLOSING,
            actions::LOCKING,
            actions::UNLOCKING,
            actions::TAKING,
            actions::DROPPING,
            actions::PUTTING,
            actions::EXAMINING,
            actions::INVENTORY,
            actions::GOING,
        ] {
            let action = registry.get(id).unwrap();
            assert!(!action.group().is_empty());
            assert!(!action.required_messages().is_empty());
        }
    }

    #[test]
    fn standard_chain_registered() {
        let mut chains = ChainRegistry::new();
        register_standard_chains(&mut chains);
        assert!(chains.has_chain(events::OPENED, OPENED_REVEALED_CHAIN));
    }

    #[test]
    fn list_names_joins() {
        assert_eq!(list_names(&[]), "nothing");
        assert_eq!(list_names(&["coin".into(), "key".into()]), "coin, key");
    }
}

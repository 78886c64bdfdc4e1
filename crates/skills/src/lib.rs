//! Tactical skill library.
//!
//! Each skill turns one high-level intent into a short sequence of engine
//! calls: state fetch, clamping, the primary control call, best-effort
//! secondary toggles. The registry built here is the single source for
//! both the tactical prompt's skill menu and the executor's dispatch.

pub mod geo;

mod args;
mod comm;
mod ew;
mod flight;
mod maneuver;
mod sensor;
mod support;
mod weapon;

use std::sync::Arc;
use wingman_core::skill::SkillRegistry;
use wingman_engine::EngineApi;

pub use comm::{RadioPowerOff, RadioPowerOn};
pub use ew::{ActivateJammer, DeactivateJammer};
pub use flight::{
    CombatSpread, FlyHeading, FlyToPosition, JoinFormation, PatrolAirspace, ReturnToBase,
};
pub use maneuver::{
    ClimbAndAccelerate, DescendAndDecelerate, EvadeMissile, InterceptTarget, TurnToHeading,
};
pub use sensor::{RadarPowerOff, RadarPowerOn, RadarSearch};
pub use weapon::{AbortEngagement, BvrAttack};

/// Build the full registry over one engine handle.
pub fn build_registry(engine: Arc<EngineApi>) -> SkillRegistry {
    let mut registry = SkillRegistry::new();

    registry.register(Arc::new(ClimbAndAccelerate::new(engine.clone())));
    registry.register(Arc::new(DescendAndDecelerate::new(engine.clone())));
    registry.register(Arc::new(TurnToHeading::new(engine.clone())));
    registry.register(Arc::new(EvadeMissile::new(engine.clone())));
    registry.register(Arc::new(InterceptTarget::new(engine.clone())));

    registry.register(Arc::new(FlyToPosition::new(engine.clone())));
    registry.register(Arc::new(FlyHeading::new(engine.clone())));
    registry.register(Arc::new(PatrolAirspace::new(engine.clone())));
    registry.register(Arc::new(ReturnToBase::new(engine.clone())));
    registry.register(Arc::new(JoinFormation::new(engine.clone())));
    registry.register(Arc::new(CombatSpread::new(engine.clone())));

    registry.register(Arc::new(RadarPowerOn::new(engine.clone())));
    registry.register(Arc::new(RadarPowerOff::new(engine.clone())));
    registry.register(Arc::new(RadarSearch::new(engine.clone())));

    registry.register(Arc::new(ActivateJammer::new(engine.clone())));
    registry.register(Arc::new(DeactivateJammer::new(engine.clone())));

    registry.register(Arc::new(RadioPowerOn::new(engine.clone())));
    registry.register(Arc::new(RadioPowerOff::new(engine.clone())));

    registry.register(Arc::new(BvrAttack::new(engine.clone())));
    registry.register(Arc::new(AbortEngagement::new(engine)));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use wingman_engine::replay::ReplayRecorder;
    use wingman_engine::testing::StubTransport;

    fn registry() -> SkillRegistry {
        let engine = Arc::new(EngineApi::new(
            Arc::new(StubTransport::new()),
            Arc::new(ReplayRecorder::with_session_id("test")),
        ));
        build_registry(engine)
    }

    #[test]
    fn registry_holds_all_twenty_skills() {
        let registry = registry();
        assert_eq!(registry.len(), 20);
        for name in [
            "climb_and_accelerate",
            "descend_and_decelerate",
            "turn_to_heading",
            "evade_missile",
            "intercept_target",
            "fly_to_position",
            "fly_heading",
            "patrol_airspace",
            "return_to_base",
            "join_formation",
            "combat_spread",
            "radar_power_on",
            "radar_power_off",
            "radar_search",
            "activate_jammer",
            "deactivate_jammer",
            "radio_power_on",
            "radio_power_off",
            "bvr_attack",
            "abort_engagement",
        ] {
            assert!(registry.get(name).is_some(), "missing skill {name}");
        }
    }

    #[test]
    fn menu_lists_every_category() {
        let menu = registry().menu();
        for label in ["机动技能", "飞行控制", "传感器", "电子战", "通信", "武器"] {
            assert!(menu.contains(label), "menu missing {label}");
        }
        assert!(menu.contains("20. **"));
        assert!(!menu.contains("21. **"));
    }
}

//! Tests for equipment action systems.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use std::collections::HashMap;
    use crate::components::*;
    use crate::create_headless_app;
    use crate::equipment::*;
    use crate::pipeline::{CombatPipeline, StageDescriptor, StageKind};
    use crate::logger::{captured_lines_with, captured_logs};
    use crate::settings::CombatConfig;

    const EPS: f32 = 0.001;

    // --- Helpers ---

    fn setup_app(buffer: f32) -> App {
        let mut app = create_headless_app();
        app.insert_resource(CombatConfig {
            targeted_action_buffer: buffer,
            ..Default::default()
        });
        app.add_plugins(ActionSchedulerPlugin::in_schedule(Update));
        app
    }

    fn definition(custom: Option<PartCustom>) -> SubsystemDefinition {
        SubsystemDefinition {
            activation_processed: Some(ActivationProcessed {
                audio: Some(ActivationAudio {
                    on_first: Some("first".into()),
                    on_mid: Some("mid".into()),
                    on_last: Some("last".into()),
                }),
            }),
            custom,
        }
    }

    fn start_keyword(keyword: &str) -> PartCustom {
        PartCustom {
            floats: None,
            strings: Some(HashMap::from([(ACTION_START_TIME_KEY.to_string(), keyword.to_string())])),
        }
    }

    fn start_fraction(value: f32) -> PartCustom {
        PartCustom {
            floats: Some(HashMap::from([(ACTION_START_TIME_KEY.to_string(), value)])),
            strings: None,
        }
    }

    fn spawn_subsystem(app: &mut App, definition: SubsystemDefinition) -> Entity {
        app.world_mut().spawn(Subsystem::from(definition)).id()
    }

    fn spawn_part(app: &mut App, id: u32, subsystem: Option<Entity>, act_count: f32, act_heat: f32) -> Entity {
        let mut part = EquipmentPart::new(PartId(id));
        part.primary_subsystem = subsystem;

        app.world_mut()
            .spawn((
                part,
                PartStats::default()
                    .with(STAT_ACT_COUNT, act_count)
                    .with(STAT_ACT_HEAT, act_heat),
            ))
            .id()
    }

    fn spawn_owner(app: &mut App, faction: &str) -> Entity {
        let persistent = app.world_mut().spawn(Faction::new(faction)).id();
        app.world_mut().spawn(CombatUnit::linked(persistent)).id()
    }

    fn spawn_action(app: &mut App, part: Entity, owner: Option<Entity>, start: f32, duration: f32) -> Entity {
        let mut action = EquipmentAction::new(part, start, duration);
        action.owner = owner;
        app.world_mut().spawn(action).id()
    }

    /// Gun part (count/heat) + enemy owner, ready to fire
    fn spawn_armed_action(app: &mut App, custom: Option<PartCustom>, act_count: f32, start: f32, duration: f32) -> Entity {
        let subsystem = spawn_subsystem(app, definition(custom));
        let part = spawn_part(app, 1, Some(subsystem), act_count, 12.0);
        let owner = spawn_owner(app, "Enemies");
        spawn_action(app, part, Some(owner), start, duration)
    }

    fn run_at(app: &mut App, seconds: f32) {
        app.world_mut().resource_mut::<SimulationTime>().seconds = seconds;
        app.update();
    }

    fn attacks_of(app: &mut App, action: Entity) -> Vec<ScheduledAttack> {
        let world = app.world_mut();
        let mut query = world.query::<&ScheduledAttack>();
        let mut attacks: Vec<_> = query
            .iter(world)
            .filter(|attack| attack.source == action)
            .cloned()
            .collect();
        attacks.sort_by_key(|attack| attack.index);
        attacks
    }

    fn is_completed(app: &App, action: Entity) -> bool {
        app.world()
            .get::<EquipmentAction>(action)
            .is_some_and(|action| action.completed)
    }

    fn skip_reasons(app: &App) -> Vec<ExpansionSkip> {
        app.world()
            .resource::<Events<ActionExpansionSkipped>>()
            .iter_current_update_events()
            .map(|event| event.reason.clone())
            .collect()
    }

    fn usage_of(app: &App, part: Entity) -> PartUsage {
        *app.world().get::<PartUsage>(part).unwrap()
    }

    // --- Idempotence + window ---

    #[test]
    fn test_completed_action_is_never_expanded_again() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, None, 3.0, 0.0, 10.0);

        run_at(&mut app, 0.5);
        assert_eq!(attacks_of(&mut app, action).len(), 3);
        assert!(is_completed(&app, action));

        run_at(&mut app, 0.6);
        run_at(&mut app, 5.0);
        assert_eq!(attacks_of(&mut app, action).len(), 3);
    }

    #[test]
    fn test_no_expansion_outside_window() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, None, 1.0, 10.0, 5.0);

        run_at(&mut app, 9.999);
        assert!(attacks_of(&mut app, action).is_empty());
        assert!(!is_completed(&app, action));

        run_at(&mut app, 15.0);
        assert!(attacks_of(&mut app, action).is_empty());
        assert!(!is_completed(&app, action));
    }

    #[test]
    fn test_expansion_at_window_start() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, None, 1.0, 10.0, 5.0);

        run_at(&mut app, 10.0);
        assert_eq!(attacks_of(&mut app, action).len(), 1);
    }

    #[test]
    fn test_expansion_just_before_window_end() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, None, 1.0, 10.0, 5.0);

        run_at(&mut app, 14.99);
        assert_eq!(attacks_of(&mut app, action).len(), 1);
    }

    // --- Timing ---

    #[test]
    fn test_single_shot_default() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, None, 1.0, 10.0, 5.0);

        run_at(&mut app, 12.0);

        let attacks = attacks_of(&mut app, action);
        assert_eq!(attacks.len(), 1);
        let attack = &attacks[0];
        assert_eq!(attack.start_time, 11.0);
        assert_eq!(attack.heat_change, 12.0);
        assert!(attack.is_first && attack.is_last);
        assert_eq!(attack.index, 0);
        assert_eq!(attack.activation_sound.as_deref(), Some("first"));
    }

    #[test]
    fn test_single_shot_middle() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, Some(start_keyword("middle")), 1.0, 10.0, 10.0);

        run_at(&mut app, 10.0);

        let attacks = attacks_of(&mut app, action);
        assert!((attacks[0].start_time - 15.0).abs() < EPS, "start = {}", attacks[0].start_time);
    }

    #[test]
    fn test_non_numeric_start_time_fires_with_default_timing() {
        let mut app = setup_app(1.0);
        let definition = SubsystemDefinition::from_ron(
            r#"(
                activation_processed: Some((audio: Some((on_first: Some("shot"))))),
                custom: Some((floats: Some({"action_start_time": "soon"}))),
            )"#,
        )
        .unwrap();
        let subsystem = spawn_subsystem(&mut app, definition);
        let part = spawn_part(&mut app, 1, Some(subsystem), 1.0, 4.0);
        let owner = spawn_owner(&mut app, "Enemies");
        let action = spawn_action(&mut app, part, Some(owner), 10.0, 10.0);

        run_at(&mut app, 10.0);

        let attacks = attacks_of(&mut app, action);
        assert_eq!(attacks.len(), 1);
        assert_eq!(attacks[0].start_time, 11.0);
        assert_eq!(attacks[0].activation_sound.as_deref(), Some("shot"));
    }

    #[test]
    fn test_single_shot_unknown_keyword_starts_after_buffer() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, Some(start_keyword("whenever")), 1.0, 10.0, 10.0);

        run_at(&mut app, 10.0);

        assert_eq!(attacks_of(&mut app, action)[0].start_time, 11.0);
    }

    #[test]
    fn test_multi_shot_even_spacing() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, None, 4.0, 0.0, 10.0);

        run_at(&mut app, 0.0);

        let attacks = attacks_of(&mut app, action);
        assert_eq!(attacks.len(), 4);

        let expected = [1.0, 3.667, 6.333, 9.0];
        for (attack, time) in attacks.iter().zip(expected) {
            assert!((attack.start_time - time).abs() < EPS, "{} != {}", attack.start_time, time);
            assert_eq!(attack.heat_change, 3.0);
            assert_eq!(attack.source, action);
        }

        let sounds: Vec<_> = attacks.iter().map(|a| a.activation_sound.as_deref()).collect();
        assert_eq!(sounds, vec![Some("first"), Some("mid"), Some("mid"), Some("last")]);
    }

    #[test]
    fn test_out_of_range_percentage_is_ignored() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, Some(start_fraction(1.5)), 4.0, 0.0, 10.0);

        run_at(&mut app, 0.0);

        let attacks = attacks_of(&mut app, action);
        assert_eq!(attacks[0].start_time, 1.0);
        assert!((attacks[3].start_time - 9.0).abs() < EPS);
    }

    #[test]
    fn test_multi_shot_bias() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, Some(start_fraction(0.5)), 4.0, 0.0, 10.0);

        run_at(&mut app, 0.0);

        let attacks = attacks_of(&mut app, action);
        assert!((attacks[0].start_time - 5.0).abs() < EPS);
        assert!((attacks[3].start_time - 9.0).abs() < EPS);
    }

    #[test]
    fn test_half_count_rounds_to_even() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, None, 2.5, 0.0, 10.0);

        run_at(&mut app, 0.0);

        let attacks = attacks_of(&mut app, action);
        assert_eq!(attacks.len(), 2);
        assert_eq!(attacks[0].heat_change, 6.0);
    }

    // --- Aborts ---

    #[test]
    fn test_zero_count_produces_nothing() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, None, 0.0, 0.0, 10.0);

        run_at(&mut app, 0.0);

        assert!(attacks_of(&mut app, action).is_empty());
        assert!(is_completed(&app, action));
        assert_eq!(
            skip_reasons(&app),
            vec![ExpansionSkip::NoActions { part: PartId(1), count: 0 }]
        );
    }

    #[test]
    fn test_zero_count_logs_one_warning() {
        captured_logs();
        let mut app = setup_app(1.0);
        let subsystem = spawn_subsystem(&mut app, definition(None));
        let part = spawn_part(&mut app, 9001, Some(subsystem), 0.0, 1.0);
        let owner = spawn_owner(&mut app, "Enemies");
        spawn_action(&mut app, part, Some(owner), 0.0, 10.0);

        run_at(&mut app, 0.0);

        let lines = captured_lines_with("PartId(9001) has action count at 0");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("WARNING "));
    }

    #[test]
    fn test_invalid_action_logs_warning() {
        captured_logs();
        let mut app = setup_app(1.0);
        app.insert_resource(ActionValidator::new(|_: &EquipmentAction| false));
        spawn_armed_action(&mut app, None, 2.0, 0.0, 10.0);

        run_at(&mut app, 1.0);

        let lines = captured_lines_with("invalid equipment action");
        assert!(!lines.is_empty());
        assert!(lines.iter().all(|line| line.starts_with("WARNING ")));
    }

    #[test]
    fn test_ownerless_skip_is_silent_without_attack_logging() {
        captured_logs();
        let mut app = setup_app(1.0);
        let subsystem = spawn_subsystem(&mut app, definition(None));
        let part = spawn_part(&mut app, 1, Some(subsystem), 2.0, 1.0);
        spawn_action(&mut app, part, None, 0.0, 10.0);

        run_at(&mut app, 1.0);

        assert_eq!(skip_reasons(&app), vec![ExpansionSkip::NoOwner]);
        assert!(captured_lines_with("has no owner").is_empty());
    }

    #[test]
    fn test_dangling_part_is_inert() {
        let mut app = setup_app(1.0);
        let subsystem = spawn_subsystem(&mut app, definition(None));
        let part = spawn_part(&mut app, 1, Some(subsystem), 2.0, 1.0);
        let owner = spawn_owner(&mut app, "Enemies");
        let action = spawn_action(&mut app, part, Some(owner), 0.0, 10.0);
        app.world_mut().despawn(part);

        run_at(&mut app, 1.0);

        assert!(attacks_of(&mut app, action).is_empty());
        assert!(is_completed(&app, action));
        assert_eq!(skip_reasons(&app), vec![ExpansionSkip::PartMissing(part)]);
    }

    #[test]
    fn test_part_without_subsystem_is_inert() {
        let mut app = setup_app(1.0);
        let part = spawn_part(&mut app, 9, None, 2.0, 1.0);
        let owner = spawn_owner(&mut app, "Enemies");
        let action = spawn_action(&mut app, part, Some(owner), 0.0, 10.0);

        run_at(&mut app, 1.0);

        assert!(attacks_of(&mut app, action).is_empty());
        assert_eq!(skip_reasons(&app), vec![ExpansionSkip::NoPrimarySubsystem(PartId(9))]);
    }

    #[test]
    fn test_subsystem_without_activation_data_is_inert() {
        let mut app = setup_app(1.0);
        let subsystem = spawn_subsystem(&mut app, SubsystemDefinition::default());
        let part = spawn_part(&mut app, 1, Some(subsystem), 2.0, 1.0);
        let owner = spawn_owner(&mut app, "Enemies");
        let action = spawn_action(&mut app, part, Some(owner), 0.0, 10.0);

        run_at(&mut app, 1.0);

        assert!(attacks_of(&mut app, action).is_empty());
        assert_eq!(skip_reasons(&app), vec![ExpansionSkip::NoActivationData(subsystem)]);
    }

    #[test]
    fn test_ownerless_action_is_inert() {
        let mut app = setup_app(1.0);
        let subsystem = spawn_subsystem(&mut app, definition(None));
        let part = spawn_part(&mut app, 1, Some(subsystem), 2.0, 1.0);
        let action = spawn_action(&mut app, part, None, 0.0, 10.0);

        run_at(&mut app, 1.0);

        assert!(attacks_of(&mut app, action).is_empty());
        assert!(is_completed(&app, action));
        assert_eq!(skip_reasons(&app), vec![ExpansionSkip::NoOwner]);
    }

    #[test]
    fn test_invalid_action_is_inert() {
        let mut app = setup_app(1.0);
        app.insert_resource(ActionValidator::new(|_: &EquipmentAction| false));
        let action = spawn_armed_action(&mut app, None, 2.0, 0.0, 10.0);

        run_at(&mut app, 1.0);

        assert!(attacks_of(&mut app, action).is_empty());
        assert!(is_completed(&app, action));
        assert_eq!(skip_reasons(&app), vec![ExpansionSkip::InvalidAction]);
    }

    #[test]
    fn test_failed_action_does_not_block_others() {
        let mut app = setup_app(1.0);
        let broken = spawn_armed_action(&mut app, None, 0.0, 0.0, 10.0);
        let working = spawn_armed_action(&mut app, None, 2.0, 0.0, 10.0);

        run_at(&mut app, 1.0);

        assert!(attacks_of(&mut app, broken).is_empty());
        assert_eq!(attacks_of(&mut app, working).len(), 2);
    }

    // --- Usage accounting ---

    #[test]
    fn test_player_usage_counts_turn_once() {
        let mut app = setup_app(1.0);
        let subsystem = spawn_subsystem(&mut app, definition(None));
        let part = spawn_part(&mut app, 5, Some(subsystem), 2.0, 4.0);
        let owner = spawn_owner(&mut app, "Phantoms");

        spawn_action(&mut app, part, Some(owner), 0.0, 4.0);
        spawn_action(&mut app, part, Some(owner), 4.0, 4.0);

        run_at(&mut app, 1.0);
        run_at(&mut app, 5.0);
        assert_eq!(usage_of(&app, part), PartUsage { turns: 1, activations: 2 });

        // Новый ход
        app.world_mut().send_event(TurnStarted);
        spawn_action(&mut app, part, Some(owner), 8.0, 4.0);
        run_at(&mut app, 9.0);

        assert_eq!(usage_of(&app, part), PartUsage { turns: 2, activations: 3 });
    }

    #[test]
    fn test_same_tick_activations_share_turn() {
        let mut app = setup_app(0.0);
        let subsystem = spawn_subsystem(&mut app, definition(None));
        let part = spawn_part(&mut app, 5, Some(subsystem), 1.0, 4.0);
        let owner = spawn_owner(&mut app, "Phantoms");

        spawn_action(&mut app, part, Some(owner), 0.0, 4.0);
        spawn_action(&mut app, part, Some(owner), 0.5, 4.0);

        run_at(&mut app, 1.0);

        assert_eq!(usage_of(&app, part), PartUsage { turns: 1, activations: 2 });
        assert!(app.world().resource::<TurnActivations>().contains(PartId(5)));
    }

    #[test]
    fn test_enemy_usage_not_tracked() {
        let mut app = setup_app(1.0);
        let subsystem = spawn_subsystem(&mut app, definition(None));
        let part = spawn_part(&mut app, 5, Some(subsystem), 2.0, 4.0);
        let owner = spawn_owner(&mut app, "Enemies");
        let action = spawn_action(&mut app, part, Some(owner), 0.0, 4.0);

        run_at(&mut app, 1.0);

        assert_eq!(attacks_of(&mut app, action).len(), 2);
        assert_eq!(usage_of(&app, part), PartUsage::default());
        assert!(app.world().resource::<TurnActivations>().is_empty());
    }

    #[test]
    fn test_owner_without_persistent_record_not_tracked() {
        let mut app = setup_app(1.0);
        let subsystem = spawn_subsystem(&mut app, definition(None));
        let part = spawn_part(&mut app, 5, Some(subsystem), 2.0, 4.0);
        let owner = app.world_mut().spawn(CombatUnit::default()).id();
        let action = spawn_action(&mut app, part, Some(owner), 0.0, 4.0);

        run_at(&mut app, 1.0);

        assert_eq!(attacks_of(&mut app, action).len(), 2);
        assert_eq!(usage_of(&app, part), PartUsage::default());
    }

    #[test]
    fn test_zero_count_player_part_not_tracked() {
        let mut app = setup_app(1.0);
        let subsystem = spawn_subsystem(&mut app, definition(None));
        let part = spawn_part(&mut app, 5, Some(subsystem), 0.0, 4.0);
        let owner = spawn_owner(&mut app, "Phantoms");
        spawn_action(&mut app, part, Some(owner), 0.0, 4.0);

        run_at(&mut app, 1.0);

        assert_eq!(usage_of(&app, part), PartUsage::default());
    }

    // --- Plugin ---

    #[test]
    fn test_plugin_replaces_stock_stage_in_host_pipeline() {
        let mut app = create_headless_app();
        app.insert_resource(CombatPipeline::new(vec![
            StageDescriptor::execute("movement"),
            StageDescriptor::execute(EQUIPMENT_ACTION_STAGE),
            StageDescriptor::execute("damage"),
        ]));
        app.add_plugins(ActionSchedulerPlugin::in_schedule(Update));

        let pipeline = app.world().resource::<CombatPipeline>();
        assert_eq!(pipeline.position(StageKind::Execute, DELAYED_EQUIPMENT_ACTION_STAGE), Some(1));
        assert_eq!(pipeline.position(StageKind::Execute, EQUIPMENT_ACTION_STAGE), None);
    }

    #[test]
    fn test_expanded_event_reports_count() {
        let mut app = setup_app(1.0);
        let action = spawn_armed_action(&mut app, None, 3.0, 0.0, 10.0);

        run_at(&mut app, 1.0);

        let expanded: Vec<_> = app
            .world()
            .resource::<Events<ActionExpanded>>()
            .iter_current_update_events()
            .map(|event| (event.action, event.count))
            .collect();
        assert_eq!(expanded, vec![(action, 3)]);
    }
}

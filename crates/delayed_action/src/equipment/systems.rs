//! Equipment action systems
//!
//! # Systems
//!
//! - `reset_turn_activations` — очищает per-turn set на `TurnStarted`
//! - `schedule_equipment_actions` — разворачивает action в `ScheduledAttack`
//!   когда время симуляции входит в его окно

use bevy::prelude::*;

use crate::{
    components::*,
    equipment::{
        error::ExpansionSkip,
        events::*,
        timeline::{contains_time, round_action_count, ActionTimeline},
        usage::TurnActivations,
        validation::ActionValidator,
    },
    log, log_warning,
    settings::{CombatConfig, LoggingFlag, LoggingSettings},
};

// ============================================================================
// Turn boundary
// ============================================================================

/// Clear the per-turn activation set when a new turn starts
pub fn reset_turn_activations(
    mut events: EventReader<TurnStarted>,
    mut turn_activations: ResMut<TurnActivations>,
) {
    if events.read().count() > 0 {
        turn_activations.clear();
    }
}

// ============================================================================
// Scheduling
// ============================================================================

/// Expand equipment actions whose window contains the current simulation time.
///
/// # Flow (per action)
/// 1. Skip completed / out-of-window
/// 2. `completed = true` сразу — повторного входа не будет даже при abort
/// 3. Resolve part → validate → subsystem → activation data → act_count → owner
/// 4. Usage accounting (только фракция игрока)
/// 5. Timeline → spawn `ScheduledAttack` (видны после apply commands)
#[allow(clippy::too_many_arguments)]
pub fn schedule_equipment_actions(
    mut commands: Commands,
    time: Res<SimulationTime>,
    config: Res<CombatConfig>,
    settings: Res<LoggingSettings>,
    validator: Res<ActionValidator>,
    mut turn_activations: ResMut<TurnActivations>,
    mut actions: Query<(Entity, &mut EquipmentAction)>,
    mut parts: Query<(&EquipmentPart, &PartStats, &mut PartUsage)>,
    subsystems: Query<&Subsystem>,
    units: Query<&CombatUnit>,
    factions: Query<&Faction>,
    mut expanded_events: EventWriter<ActionExpanded>,
    mut skipped_events: EventWriter<ActionExpansionSkipped>,
) {
    let now = time.seconds;

    for (entity, mut action) in actions.iter_mut() {
        if action.completed {
            continue;
        }

        if !contains_time(now, action.start_time, action.duration) {
            continue;
        }

        action.completed = true;

        let Ok((part, stats, mut usage)) = parts.get_mut(action.part) else {
            report_skip(&mut skipped_events, &settings, entity, ExpansionSkip::PartMissing(action.part));
            continue;
        };

        if !validator.is_valid(&action) {
            report_skip(&mut skipped_events, &settings, entity, ExpansionSkip::InvalidAction);
            continue;
        }

        let Some(subsystem_entity) = part.primary_subsystem else {
            report_skip(&mut skipped_events, &settings, entity, ExpansionSkip::NoPrimarySubsystem(part.id));
            continue;
        };

        // Подсистема без processed activation data = misconfigured
        let Some((subsystem, activation)) = subsystems
            .get(subsystem_entity)
            .ok()
            .and_then(|s| s.activation.as_ref().map(|a| (s, a)))
        else {
            report_skip(&mut skipped_events, &settings, entity, ExpansionSkip::NoActivationData(subsystem_entity));
            continue;
        };

        let count = round_action_count(stats.cached_stat(STAT_ACT_COUNT));
        if count <= 0 {
            report_skip(&mut skipped_events, &settings, entity, ExpansionSkip::NoActions { part: part.id, count });
            continue;
        }

        let Some(owner) = action.owner else {
            report_skip(&mut skipped_events, &settings, entity, ExpansionSkip::NoOwner);
            continue;
        };

        if is_player_owned(owner, &config.player_faction, &units, &factions) {
            usage.record_activation(part.id, &mut turn_activations);
        }

        let timeline = ActionTimeline::compute(
            action.start_time,
            action.duration,
            config.targeted_action_buffer,
            count as u32,
            stats.cached_stat(STAT_ACT_HEAT),
            &subsystem.timing,
        );

        if settings.is_logging_enabled(LoggingFlag::ATTACK) {
            if timeline.count == 1 {
                log(&format!("delayed single shot | start time: {}", timeline.first_start));
            } else {
                log(&format!(
                    "delayed multi-shot | start time: {} | spacing: {}",
                    timeline.first_start, timeline.spacing
                ));
            }
        }

        for attack in timeline.sub_attacks(entity, activation.audio.as_ref()) {
            commands.spawn(attack);
        }

        expanded_events.write(ActionExpanded {
            action: entity,
            part: part.id,
            count: timeline.count,
        });
    }
}

/// Owner → linked persistent record → faction == player faction
fn is_player_owned(
    owner: Entity,
    player_faction: &str,
    units: &Query<&CombatUnit>,
    factions: &Query<&Faction>,
) -> bool {
    units
        .get(owner)
        .ok()
        .and_then(|unit| unit.persistent)
        .and_then(|persistent| factions.get(persistent).ok())
        .is_some_and(|faction| faction.is(player_faction))
}

fn report_skip(
    events: &mut EventWriter<ActionExpansionSkipped>,
    settings: &LoggingSettings,
    action: Entity,
    reason: ExpansionSkip,
) {
    if reason.is_warning() {
        log_warning(&format!("Action {:?}: {}", action, reason));
    } else if settings.is_logging_enabled(LoggingFlag::ATTACK) {
        log(&format!("Action {:?} skipped: {}", action, reason));
    }

    events.write(ActionExpansionSkipped { action, reason });
}

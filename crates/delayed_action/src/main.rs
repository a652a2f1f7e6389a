//! Headless симуляция DELAYED ACTION
//!
//! Два хода боя: player mech с четырёхзарядной пушкой и single-shot
//! launcher'ом ("middle"), плюс вражеская часть. Печатает scheduled attacks
//! и usage counters.

use bevy::prelude::*;
use delayed_action::*;

const TICK: f32 = 0.25;
const TURN_LENGTH: f32 = 5.0;

fn main() {
    let mut app = create_headless_app();
    app.insert_resource(LoggingSettings::load_or_default(std::path::Path::new(SETTINGS_FILE)))
        .add_plugins(ActionSchedulerPlugin::in_schedule(Update));

    let world = app.world_mut();

    let gun_subsystem = world
        .spawn(Subsystem::from(demo_definition(r#"(
            activation_processed: Some((audio: Some((
                on_first: Some("gun_first"),
                on_mid: Some("gun_mid"),
                on_last: Some("gun_last"),
            )))),
        )"#)))
        .id();
    let launcher_subsystem = world
        .spawn(Subsystem::from(demo_definition(r#"(
            activation_processed: Some((audio: Some((on_first: Some("launcher"))))),
            custom: Some((strings: Some({"action_start_time": "middle"}))),
        )"#)))
        .id();

    let gun = world
        .spawn((
            EquipmentPart::new(PartId(1)).with_subsystem(gun_subsystem),
            PartStats::default().with(STAT_ACT_COUNT, 4.0).with(STAT_ACT_HEAT, 20.0),
        ))
        .id();
    let launcher = world
        .spawn((
            EquipmentPart::new(PartId(2)).with_subsystem(launcher_subsystem),
            PartStats::default().with(STAT_ACT_COUNT, 1.0).with(STAT_ACT_HEAT, 35.0),
        ))
        .id();
    let enemy_gun = world
        .spawn((
            EquipmentPart::new(PartId(3)).with_subsystem(gun_subsystem),
            PartStats::default().with(STAT_ACT_COUNT, 3.0).with(STAT_ACT_HEAT, 9.0),
        ))
        .id();

    let pilot = world.spawn(Faction::new("Phantoms")).id();
    let mech = world.spawn(CombatUnit::linked(pilot)).id();
    let enemy = world.spawn(CombatUnit::default()).id();

    // Turn 1
    world.spawn(EquipmentAction::new(gun, 0.0, 2.0).with_owner(mech));
    world.spawn(EquipmentAction::new(launcher, 1.0, 3.0).with_owner(mech));
    world.spawn(EquipmentAction::new(enemy_gun, 0.5, 1.5).with_owner(enemy));
    // Turn 2
    world.spawn(EquipmentAction::new(gun, 5.0, 2.0).with_owner(mech));
    world.spawn(EquipmentAction::new(gun, 7.5, 2.0).with_owner(mech));

    println!("Starting DELAYED ACTION headless simulation");

    let ticks = (2.0 * TURN_LENGTH / TICK) as usize;
    for tick in 0..ticks {
        let seconds = tick as f32 * TICK;
        if tick > 0 && seconds % TURN_LENGTH == 0.0 {
            app.world_mut().send_event(TurnStarted);
            println!("--- turn boundary at {:.2}s ---", seconds);
        }

        app.world_mut().resource_mut::<SimulationTime>().seconds = seconds;
        app.update();
    }

    let world = app.world_mut();
    let mut query = world.query::<&ScheduledAttack>();
    let mut attacks: Vec<_> = query.iter(world).cloned().collect();
    attacks.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    for attack in &attacks {
        println!(
            "t={:>6.3} source={:?} #{} first={} last={} heat={:.2} sound={}",
            attack.start_time,
            attack.source,
            attack.index,
            attack.is_first,
            attack.is_last,
            attack.heat_change,
            attack.activation_sound.as_deref().unwrap_or("-"),
        );
    }

    for (name, part) in [("gun", gun), ("launcher", launcher), ("enemy gun", enemy_gun)] {
        if let Some(usage) = app.world().get::<PartUsage>(part) {
            println!("{}: turns={} activations={}", name, usage.turns, usage.activations);
        }
    }

    println!("Simulation complete!");
}

fn demo_definition(content: &str) -> SubsystemDefinition {
    SubsystemDefinition::from_ron(content).unwrap_or_else(|e| {
        log_error(&format!("bad subsystem definition: {}", e));
        SubsystemDefinition::default()
    })
}

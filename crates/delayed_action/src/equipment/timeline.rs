//! Timeline of a single activation
//!
//! Окно `[start, start + duration)` сужается buffer'ом с обеих сторон,
//! sub-attacks раскладываются по оставшемуся `usable` интервалу:
//!
//! ```text
//! start   start+buffer                     end-buffer   end
//!   |--------|==========usable===============|----------|
//!            ^ first    ^ +spacing   ^ ...   ^ last
//! ```

use bevy::prelude::*;

use crate::components::{ActivationAudio, ScheduledAttack};
use crate::equipment::policy::TimingPolicy;

/// Half-open containment: inclusive at start, exclusive at end
pub fn contains_time(time: f32, start: f32, duration: f32) -> bool {
    time >= start && time < start + duration
}

/// Continuous `act_count` stat → action count.
///
/// Ties round to even (host numeric convention): 2.5 → 2, 3.5 → 4.
/// NaN → 0.
pub fn round_action_count(stat: f32) -> i32 {
    stat.round_ties_even() as i32
}

/// Computed placement of the sub-attacks of one activation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionTimeline {
    /// Absolute time of sub-attack 0
    pub first_start: f32,
    /// Gap between consecutive sub-attacks
    pub spacing: f32,
    pub count: u32,
    pub heat_per_attack: f32,
}

impl ActionTimeline {
    /// `count` must be > 0 (caller guards `act_count <= 0`).
    pub fn compute(
        start_time: f32,
        duration: f32,
        buffer: f32,
        count: u32,
        heat: f32,
        policy: &TimingPolicy,
    ) -> Self {
        let base_start = start_time + buffer;
        let usable = duration - 2.0 * buffer;
        // max(..., 1) — нет деления на ноль при count == 1
        let mut spacing = usable / (count as f32 - 1.0).max(1.0);

        let first_start = if count == 1 {
            base_start + policy.single_shot_offset(spacing)
        } else {
            // Bias съедает начало окна, остальные выстрелы сжимаются в остаток
            let pct = policy.percentage;
            spacing *= 1.0 - pct;
            base_start + usable * pct
        };

        Self {
            first_start,
            spacing,
            count,
            heat_per_attack: heat / count.max(1) as f32,
        }
    }

    /// Time of the last sub-attack
    pub fn last_start(&self) -> f32 {
        self.first_start + self.spacing * self.count.saturating_sub(1) as f32
    }

    /// Sub-attack records in index order, produced lazily.
    ///
    /// Start times accumulate (`t += spacing`) the same way the host
    /// accumulates them, so downstream comparisons see identical floats.
    /// Огромный `act_count` не аллоцирует всё разом.
    pub fn sub_attacks<'a>(
        &'a self,
        source: Entity,
        audio: Option<&'a ActivationAudio>,
    ) -> impl Iterator<Item = ScheduledAttack> + 'a {
        (0..self.count).scan(self.first_start, move |start_time, index| {
            let attack = ScheduledAttack {
                start_time: *start_time,
                source,
                index,
                is_first: index == 0,
                is_last: index + 1 == self.count,
                activation_sound: activation_sound(index, self.count, audio).map(str::to_string),
                heat_change: self.heat_per_attack,
            };

            *start_time += self.spacing;
            Some(attack)
        })
    }
}

/// first → mid → last; при count == 1 выигрывает first
fn activation_sound(index: u32, count: u32, audio: Option<&ActivationAudio>) -> Option<&str> {
    let audio = audio?;
    if index == 0 {
        audio.first()
    } else if index + 1 == count {
        audio.last()
    } else {
        audio.mid()
    }
}

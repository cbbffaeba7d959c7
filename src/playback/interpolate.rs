use crate::core::{EntityCollections, Positioned, Step};
use crate::playback::PairingMode;

/// Linear blend of two values
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Blend two steps at `t` in `[0, 1]`.
///
/// Only positions move. Every other field (color, size, team, number) comes
/// from `current`, and the output has exactly the entities of `current`.
/// Teams carry no position and are copied as-is.
pub fn interpolate_step(current: &Step, next: &Step, t: f64, pairing: PairingMode) -> EntityCollections {
    EntityCollections {
        players: interpolate_items(&current.players, &next.players, t, pairing),
        balls: interpolate_items(&current.balls, &next.balls, t, pairing),
        goals: interpolate_items(&current.goals, &next.goals, t, pairing),
        cones: interpolate_items(&current.cones, &next.cones, t, pairing),
        teams: current.teams.clone(),
    }
}

/// Blend one collection. Entities without a partner in `next` hold their
/// current position.
pub fn interpolate_items<T: Positioned>(current: &[T], next: &[T], t: f64, pairing: PairingMode) -> Vec<T> {
    current
        .iter()
        .enumerate()
        .map(|(index, a)| {
            let partner = match pairing {
                PairingMode::ByIndex => next.get(index),
                PairingMode::ById => next.iter().find(|b| b.id() == a.id()),
            };

            let mut out = a.clone();
            if let Some(b) = partner {
                let (ax, ay) = a.position();
                let (bx, by) = b.position();
                out.set_position(lerp(ax, bx, t), lerp(ay, by, t));
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Ball, Goal, Player, Team};

    fn player(id: u64, number: u32, x: f64, y: f64) -> Player {
        Player {
            id,
            number,
            x,
            y,
            color: "#000000".to_string(),
            team_id: None,
        }
    }

    #[test]
    fn test_midpoint() {
        let mut a = EntityCollections::new();
        let mut b = EntityCollections::new();
        a.balls.push(Ball { id: 1, x: 0.0, y: 10.0, color: None });
        b.balls.push(Ball { id: 1, x: 100.0, y: 30.0, color: None });

        let frame = interpolate_step(&a, &b, 0.5, PairingMode::ByIndex);
        assert!((frame.balls[0].x - 50.0).abs() < 1e-9);
        assert!((frame.balls[0].y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_positional_fields_come_from_current() {
        let mut a = EntityCollections::new();
        let mut b = EntityCollections::new();
        a.goals.push(Goal { id: 1, x: 0.0, y: 0.0, width: 70.0, depth: 20.0, color: Some("red".into()) });
        b.goals.push(Goal { id: 1, x: 10.0, y: 0.0, width: 140.0, depth: 40.0, color: Some("blue".into()) });
        a.teams.push(Team { id: 5, name: "A".into(), color: "red".into() });
        b.teams.push(Team { id: 5, name: "B".into(), color: "blue".into() });

        let frame = interpolate_step(&a, &b, 1.0, PairingMode::ByIndex);
        assert_eq!(frame.goals[0].x, 10.0);
        assert_eq!(frame.goals[0].width, 70.0);
        assert_eq!(frame.goals[0].color.as_deref(), Some("red"));
        assert_eq!(frame.teams[0].name, "A");
    }

    #[test]
    fn test_positional_pairing_tolerates_mismatched_lengths() {
        let current = vec![player(1, 1, 0.0, 0.0), player(2, 2, 10.0, 10.0), player(3, 3, 20.0, 20.0)];
        let next = vec![player(2, 2, 100.0, 100.0)];

        let frame = interpolate_items(&current, &next, 0.5, PairingMode::ByIndex);
        assert_eq!(frame.len(), 3);
        // Index pairing: player 1 is paired with player 2's next position
        assert_eq!(frame[0].position(), (50.0, 50.0));
        assert_eq!(frame[1].position(), (10.0, 10.0));
        assert_eq!(frame[2].position(), (20.0, 20.0));
    }

    #[test]
    fn test_id_pairing_follows_ids() {
        let current = vec![player(1, 1, 0.0, 0.0), player(2, 2, 10.0, 10.0)];
        let next = vec![player(2, 2, 30.0, 10.0)];

        let frame = interpolate_items(&current, &next, 0.5, PairingMode::ById);
        assert_eq!(frame[0].position(), (0.0, 0.0));
        assert_eq!(frame[1].position(), (20.0, 10.0));
    }

    #[test]
    fn test_empty_next_holds_current() {
        let current = vec![player(1, 1, 3.0, 4.0)];
        let frame = interpolate_items(&current, &[], 0.75, PairingMode::ByIndex);
        assert_eq!(frame, current);
    }
}

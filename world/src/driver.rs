//! Realtime loop that advances a world with wall-clock time.

use std::{
    thread,
    time::{Duration, Instant},
};

use tower_defence_core::{Command, Event, GameError, LifecycleState};
use tracing::{debug, info};

use crate::{apply, World};

/// Drives `world` until it stops or `frame` asks to exit.
///
/// Each iteration measures the wall time elapsed since the previous one,
/// scales it by the configured game speed and applies it as a tick. The
/// events of that tick and the processing time of the previous iteration are
/// then handed to `frame`, which may render the world or apply further
/// commands. The loop sleeps for whatever remains of the configured tick
/// delay.
///
/// `frame` returning [`GameError::Exit`] ends the loop with `Ok(())`. Any
/// other error is propagated.
pub fn run<F>(world: &mut World, mut frame: F) -> Result<(), GameError>
where
    F: FnMut(&mut World, &[Event], Duration) -> Result<(), GameError>,
{
    let tick_delay = world.config.tick_delay();
    let game_speed = world.config.game_speed;
    let mut events: Vec<Event> = Vec::new();
    let mut processing = Duration::ZERO;
    let mut last = Instant::now();

    while world.state.lifecycle != LifecycleState::Stopped {
        let now = Instant::now();
        events.clear();
        apply(
            world,
            Command::Tick {
                dt: now.duration_since(last) * game_speed,
            },
            &mut events,
        )?;

        match frame(world, &events, processing) {
            Ok(()) => {}
            Err(GameError::Exit) => {
                info!("driver exit requested");
                return Ok(());
            }
            Err(error) => return Err(error),
        }

        last = now;
        processing = now.elapsed();
        thread::sleep(tick_delay.saturating_sub(processing));
    }

    debug!("driver finished, game stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defence_core::GameConfig;

    fn fast_world() -> World {
        World::new(GameConfig {
            seed: Some(1),
            tick_delay_ms: 1,
            field_width: 6,
            field_height: 6,
            ..GameConfig::default()
        })
    }

    #[test]
    fn exit_request_ends_the_loop_cleanly() {
        let mut world = fast_world();
        let mut frames = 0;

        let outcome = run(&mut world, |_, _, _| {
            frames += 1;
            if frames == 3 {
                Err(GameError::Exit)
            } else {
                Ok(())
            }
        });

        assert_eq!(outcome, Ok(()));
        assert_eq!(frames, 3);
    }

    #[test]
    fn stopping_the_game_ends_the_loop() {
        let mut world = fast_world();
        let mut events = Vec::new();
        apply(&mut world, Command::Start, &mut events).expect("start succeeds");

        let outcome = run(&mut world, |world, _, _| {
            let mut events = Vec::new();
            apply(world, Command::Stop, &mut events)
        });

        assert_eq!(outcome, Ok(()));
        assert_eq!(world.state.lifecycle, LifecycleState::Stopped);
    }

    #[test]
    fn frame_errors_are_propagated() {
        let mut world = fast_world();
        let outcome = run(&mut world, |_, _, _| Err(GameError::NotBuilding));
        assert_eq!(outcome, Err(GameError::NotBuilding));
    }
}

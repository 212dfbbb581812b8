//! Slot Defense entry point
//!
//! Runs a headless session with a simple scripted player and logs the HUD.
//!
//! Usage: `slot-defense [settings.json] [minutes]`
//!        `slot-defense dungeon [rooms]`

use rand::SeedableRng;
use rand_pcg::Pcg32;
use slot_defense::consts::*;
use slot_defense::dungeon::{self, DungeonInput, Run};
use slot_defense::sim::{Intent, Rarity};
use slot_defense::{GameLoop, Hud, Settings};

/// Real milliseconds per rendered frame
const FRAME_MS: f32 = 1000.0 / 60.0;
/// Give up on a dungeon room after five minutes of frames
const ROOM_FRAME_LIMIT: u32 = 60 * 60 * 5;

fn main() {
    env_logger::init();
    log::info!("Slot Defense (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("dungeon") {
        let rooms = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(3);
        run_dungeon(rooms);
        return;
    }

    let settings = match args.first() {
        Some(path) => Settings::load(path).unwrap_or_else(|err| {
            log::warn!("{err}; using default settings");
            Settings::default()
        }),
        None => Settings::default(),
    };
    let minutes: u32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(10);
    run_defense(&settings, minutes);
}

/// Scripted player: summon whenever affordable, merge and upgrade every
/// few seconds, evolve when possible
fn run_defense(settings: &Settings, minutes: u32) {
    let mut game = GameLoop::new(settings);
    let mut hud = Hud::new(game.state.gold, game.state.tickets);
    let frames = minutes as u64 * 60 * 60;

    for frame in 0..frames {
        if frame % 30 == 0 {
            plan_actions(&mut game, &hud);
        }
        let events = game.frame(FRAME_MS);
        hud.apply_all(&events);

        if frame % 600 == 0 {
            log::info!("{}", hud.status_line());
        }
        if hud.game_over {
            break;
        }
    }

    let snapshot = game.state.snapshot();
    println!("Reached wave {} ({} units on the board)", snapshot.wave, snapshot.towers.len());
    for notice in &hud.notices {
        println!("  {notice}");
    }
}

fn plan_actions(game: &mut GameLoop, hud: &Hud) {
    let state = &game.state;
    let mut intents = Vec::new();

    if hud.tickets > 0 {
        intents.push(Intent::Gamble);
    }
    if state.gold >= state.summon_cost {
        intents.push(Intent::Summon { cell: None, rarity: None });
    }
    if state.empty_cells().len() < 4 {
        intents.push(Intent::AutoMerge);
    }
    for rarity in [Rarity::Common, Rarity::Rare] {
        if state.gold >= rarity.upgrade_cost() * 3 {
            intents.push(Intent::Upgrade { rarity });
        }
    }
    if let Some(option) = state
        .towers()
        .iter()
        .find_map(|t| state.evolution_option(t.id))
    {
        intents.push(Intent::Evolve {
            target: option.target.name.to_string(),
            ingredients: option.ingredients,
        });
    }
    if state.enemies().len() < MAX_ENEMIES / 4 {
        intents.push(Intent::SummonChallengeBoss);
    }

    for intent in intents {
        game.push_intent(intent);
    }
}

/// Scripted dungeon crawl: circle around the room center and dash when hurt
fn run_dungeon(rooms: u32) {
    let mut run = Run::new();
    for room_index in 0..rooms {
        let mut room = run.enter_room(room_index as u64 + 1);
        let mut frame = 0u32;
        loop {
            let t = frame as f32 * 0.02;
            let input = DungeonInput {
                move_dir: glam::Vec2::new(t.cos(), t.sin()),
                dash: room.player.hp < 50.0 && frame % 60 == 0,
                viewport: None,
            };
            dungeon::tick(&mut room, &input);
            frame += 1;

            let events = room.drain_events();
            if events.contains(&dungeon::DungeonEvent::PlayerDied) {
                println!("Died at depth {} after {} kills", room.depth, room.kills);
                return;
            }
            if room.is_cleared() {
                break;
            }
            if frame >= ROOM_FRAME_LIMIT {
                println!("Stalled at depth {} with {} enemies left", room.depth, room.enemies_left());
                return;
            }
        }

        let (god, offer) = dungeon::offer_boons(&mut Pcg32::seed_from_u64(room.frame));
        let boon = dungeon::Boon { god, mechanic: offer[0] };
        log::info!("{:?} grants {:?}", god, boon.mechanic);
        run.complete_room(room.player.hp, boon);
    }
    println!("Escaped {} rooms with {:.0} hp", run.depth, run.hp);
}

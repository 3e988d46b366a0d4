//! Terminal demo: a player collects coins across a field of drifting
//! obstacles while a hunter follows their heat trail.
//!
//! Run: cargo run --bin world -- [seed] [max-turns]
//! Set `RUST_LOG=debug` to see pathfinder, FOV and heatmap summaries.

use gridwise_demos::{Turn, World};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(42);
    let max_turns: u32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(300);

    let mut world = World::generate(seed)?;
    let (circles, rects) = world.shape_counts();
    println!("seed {seed}: {circles} circles, {rects} rectangles");
    print!("{}", world.render());

    let outcome = loop {
        if world.turns() >= max_turns {
            break None;
        }
        match world.step()? {
            Turn::Moved => continue,
            Turn::Collected => {
                println!("turn {}: {} coins left", world.turns(), world.coins().len());
                print!("{}", world.render());
            }
            other => break Some(other),
        }
    };

    print!("{}", world.render());
    match outcome {
        Some(Turn::Done) => println!("all coins collected in {} turns", world.turns()),
        Some(Turn::Caught) => println!("caught by the hunter on turn {}", world.turns()),
        Some(Turn::Stuck) => println!("no coin left in reach after {} turns", world.turns()),
        _ => println!("stopped after {} turns", world.turns()),
    }
    Ok(())
}

//! Dump a handful of sampled endcap crystals with their volumes.

use calo_crystal::prelude::*;

fn main() {
    for index in 0..8 {
        let s = draw_crystal(Subsystem::Endcap, TaperCfg::default(), ReplayToken::new(2024, index))
            .expect("endcap sampling");
        let mut crystal = Crystal::new(s.cell);
        match crystal.set_corners(&s.corners, &s.reference) {
            Ok(g) => {
                println!(
                    "reference ({:.1}, {:.1}, {:.1})  volume {:.3} cm^3",
                    s.reference.x,
                    s.reference.y,
                    s.reference.z,
                    g.volume()
                );
                print!("{crystal}");
            }
            Err(err) => eprintln!("cell {}: {err}", s.cell),
        }
    }
}

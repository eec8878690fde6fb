//! Research planner example: build a tech set in code and plan towards a goal.
//!
//! Registers a small slice of a 4X tech web across two categories, then
//! shows the research frontier, both goal orderings, and a turn-by-turn
//! walk that always researches the cheapest next step.
//!
//! Run with: `RUST_LOG=debug cargo run -p techweb-examples --example research_planner`

use std::collections::BTreeSet;
use techweb_core::*;

fn main() {
    tracing_subscriber::fmt::init();

    let mut builder = TechIndexBuilder::new();
    builder
        .register_category(TechCategory {
            colour: Colour::rgba(54, 202, 229, 255),
            ..TechCategory::new("LEARNING_CATEGORY")
        })
        .expect("register learning");
    builder
        .register_category(TechCategory {
            colour: Colour::rgba(116, 225, 107, 255),
            ..TechCategory::new("GROWTH_CATEGORY")
        })
        .expect("register growth");

    let techs = [
        TechDef::new("LRN_ALGO_ELEGANCE", "LEARNING_CATEGORY", 10.0),
        TechDef::new("GRO_PLANET_ECOL", "GROWTH_CATEGORY", 10.0),
        TechDef::new("GRO_GENETIC_ENG", "GROWTH_CATEGORY", 9.0)
            .with_prerequisites(["GRO_PLANET_ECOL"]),
        TechDef::new("LRN_PHYS_BRAIN", "LEARNING_CATEGORY", 12.0)
            .with_prerequisites(["LRN_ALGO_ELEGANCE"]),
        TechDef::new("LRN_NASCENT_AI", "LEARNING_CATEGORY", 48.0)
            .with_prerequisites(["LRN_PHYS_BRAIN"]),
        TechDef {
            research_turns: 8,
            unlocked_items: vec![ItemSpec::new(UnlockableItemType::Building, "BLD_GENOME_BANK")],
            ..TechDef::new("GRO_SYMBIOTIC_BIO", "GROWTH_CATEGORY", 90.0)
                .with_prerequisites(["GRO_GENETIC_ENG", "LRN_PHYS_BRAIN"])
        },
    ];
    for def in techs {
        builder.register_tech(def).expect("register tech");
    }

    let index = builder.build().expect("valid tech web");
    println!(
        "Built {} techs in {} categories.\n",
        index.tech_count(),
        index.category_count()
    );

    let prog = index.progression();
    let goal = "GRO_SYMBIOTIC_BIO";
    let mut researched: BTreeSet<String> = BTreeSet::new();

    // --- Frontier ---

    println!("=== Frontier at start ===");
    for tech in prog.frontier(&researched) {
        println!("  {} ({} RP)", tech.name(), tech.research_cost());
    }

    // --- Goal orderings ---

    println!("\n=== Path towards {goal} (by depth) ===");
    for tech in prog.path_towards(&researched, goal).expect("goal reachable") {
        println!("  {}", tech.name());
    }

    println!("\n=== Path towards {goal} (cheapest first) ===");
    for tech in prog
        .cheapest_path_towards(&researched, goal)
        .expect("goal reachable")
    {
        println!("  {}", tech.name());
    }

    // --- Walk the plan ---

    println!("\n=== Researching ===");
    let mut turn = 0;
    while let Some(next) = prog
        .cheapest_next_tech_towards(&researched, goal)
        .expect("goal reachable")
    {
        turn += next.research_time();
        println!(
            "  turn {turn:>3}: {} done ({:.1} RP/turn)",
            next.name(),
            next.per_turn_cost()
        );
        researched.insert(next.name().to_string());
    }

    println!("\n{goal} unlocks:");
    let goal_tech = index.lookup(goal).expect("goal exists");
    for item in goal_tech.unlocked_items() {
        println!("  {} {}", item.kind.as_str(), item.name);
    }

    println!("\nStill open after reaching the goal:");
    for tech in prog.frontier(&researched) {
        println!("  {}", tech.name());
    }
}

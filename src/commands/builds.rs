use anyhow::{bail, Result};
use lol_state::{roles, PickTriple};
use serde_json::json;
use std::path::Path;

use super::open_capture;
use crate::config::AppConfig;
use crate::pipeline::AppContext;

/// `NAME:ROLE`, or a bare name with unknown role
pub fn parse_enemy(raw: &str) -> Result<PickTriple> {
    let (champion, role) = match raw.split_once(':') {
        Some((c, r)) => (c.trim(), r.trim()),
        None => (raw.trim(), roles::UNKNOWN),
    };
    if champion.is_empty() {
        bail!("enemy '{}' has no champion name", raw);
    }
    Ok(PickTriple {
        champion: champion.to_string(),
        rune: None,
        role: if role.is_empty() { roles::UNKNOWN } else { role }.to_string(),
    })
}

pub fn run(
    config: AppConfig,
    champion: &str,
    screenshot: Option<&Path>,
    enemies: &[String],
    json: bool,
) -> Result<()> {
    let ctx = AppContext::load(config);

    let enemies: Vec<PickTriple> = match screenshot {
        Some(path) => ctx.read_loading_screen(&open_capture(path)?, champion)?.1,
        None => enemies
            .iter()
            .map(|e| parse_enemy(e))
            .collect::<Result<_>>()?,
    };
    if enemies.is_empty() {
        bail!("no enemies given; pass --screenshot or --enemy NAME:ROLE");
    }

    let summary = ctx.summarize_enemies(&enemies);
    let recs = ctx.recommend_builds(champion, &enemies)?;

    if json {
        let report = json!({
            "champion": champion,
            "enemies": enemies,
            "summary": summary,
            "reasons": summary.explain(),
            "builds": recs,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for enemy in &enemies {
        println!(
            "Enemy: {} ({}, rune {})",
            enemy.champion,
            enemy.role,
            enemy.rune.as_deref().unwrap_or("-")
        );
    }
    for reason in summary.explain() {
        println!("{}", reason);
    }
    if recs.is_empty() {
        println!("No applicable build for {}", champion);
    }
    for rec in &recs {
        println!(
            "[{}] {:.1}% via {}: {}",
            rec.role,
            rec.score * 100.0,
            rec.situation,
            rec.items.join(" > ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enemy() {
        let e = parse_enemy(" Lux : AP ").unwrap();
        assert_eq!((e.champion.as_str(), e.role.as_str()), ("Lux", "AP"));
        assert_eq!(parse_enemy("Garen").unwrap().role, roles::UNKNOWN);
        assert_eq!(parse_enemy("Garen:").unwrap().role, roles::UNKNOWN);
        assert!(parse_enemy(":Tank").is_err());
    }
}

use std::io::{self, Write};

use serde::Serialize;

use crate::domain::{EnrichedRecord, ViewCriteria};
use crate::favourites::FavouriteSet;
use crate::profile::DetailView;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResult<'a> {
    pub criteria: &'a ViewCriteria,
    pub dropped_count: usize,
    pub records: &'a [EnrichedRecord],
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleResult<'a> {
    pub name: &'a str,
    pub favourite: bool,
    pub favourites: &'a FavouriteSet,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_list(result: &ListResult<'_>) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_detail(result: &DetailView) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_toggle(result: &ToggleResult<'_>) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_favourites(result: &FavouriteSet) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_list(result: &ListResult<'_>, favourites: &FavouriteSet) -> io::Result<()> {
        let mut stdout = io::stdout();
        if result.records.is_empty() {
            writeln!(stdout, "no matching creatures")?;
        }
        for record in result.records {
            let star = if favourites.contains(&record.display_name) {
                "*"
            } else {
                " "
            };
            writeln!(
                stdout,
                "{star} #{:03} {:<14} {:>4}  {}",
                record.id,
                record.display_name,
                record.stat_total,
                record.types.join("/")
            )?;
        }
        if result.dropped_count > 0 {
            writeln!(stdout, "({} entries could not be loaded)", result.dropped_count)?;
        }
        Ok(())
    }

    pub fn print_detail(view: &DetailView) -> io::Result<()> {
        let mut stdout = io::stdout();
        let profile = &view.profile;
        let star = if view.favourite { " *" } else { "" };
        writeln!(
            stdout,
            "{} {}{star}",
            profile.display_name,
            profile.formatted_id()
        )?;
        writeln!(stdout, "types: {}", profile.types.join(", "))?;
        writeln!(
            stdout,
            "height: {}m  weight: {}kg",
            profile.height_m, profile.weight_kg
        )?;
        let abilities: Vec<String> = profile
            .shown_abilities()
            .iter()
            .map(|a| {
                if a.hidden {
                    format!("{} (hidden)", a.name)
                } else {
                    a.name.clone()
                }
            })
            .collect();
        writeln!(stdout, "abilities: {}", abilities.join(", "))?;
        for stat in &profile.stats {
            writeln!(stdout, "  {:<5} {:03}", stat.label, stat.value)?;
        }
        writeln!(stdout, "  {:<5} {}", "TOTAL", profile.stat_total)?;
        if !view.lineage.is_empty() {
            let chain: Vec<String> = view.lineage.iter().map(|l| l.display_name()).collect();
            writeln!(stdout, "evolution: {}", chain.join(" -> "))?;
        }
        Ok(())
    }

    pub fn print_toggle(result: &ToggleResult<'_>) -> io::Result<()> {
        let state = if result.favourite { "added to" } else { "removed from" };
        writeln!(io::stdout(), "{} {state} favourites", result.name)
    }

    pub fn print_favourites(favourites: &FavouriteSet) -> io::Result<()> {
        let mut stdout = io::stdout();
        if favourites.is_empty() {
            writeln!(stdout, "no favourites yet")?;
        }
        for name in favourites.iter() {
            writeln!(stdout, "* {name}")?;
        }
        Ok(())
    }
}

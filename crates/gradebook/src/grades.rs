use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{FuzzySelect, Input};

use gradebook_db::{Grade, GradeStore, NewGrade};

use crate::validate::{parse_grade, parse_subject_id};

#[derive(Subcommand, Debug)]
pub enum GradesAction {
    /// List all grades, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a new grade (prompts for missing fields)
    Add {
        /// Nine-digit subject ID
        #[arg(long, value_parser = parse_subject_id)]
        sid: Option<String>,

        /// Grade text
        #[arg(long, value_parser = parse_grade)]
        grade: Option<String>,
    },

    /// Edit an existing grade
    Edit {
        /// Grade ID (launches interactive picker if omitted)
        id: Option<i64>,

        /// New nine-digit subject ID
        #[arg(long, value_parser = parse_subject_id)]
        sid: Option<String>,

        /// New grade text
        #[arg(long, value_parser = parse_grade)]
        grade: Option<String>,
    },

    /// Delete a grade
    Delete {
        /// Grade ID (launches interactive picker if omitted)
        id: Option<i64>,
    },
}

pub async fn handle_grades_command(store: &GradeStore, action: GradesAction) -> Result<()> {
    match action {
        GradesAction::List { json } => {
            let grades = store.list_all().await.context("Failed to load grades")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&grades)?);
            } else {
                print_grades(&grades, None);
            }
        }
        GradesAction::Add { sid, grade } => {
            let sid = match sid {
                Some(sid) => sid,
                None => prompt_subject_id(None)?,
            };
            let grade = match grade {
                Some(grade) => grade,
                None => prompt_grade(None)?,
            };

            let id = store
                .insert(&NewGrade::new(sid, grade))
                .await
                .context("Failed to save grade")?;
            println!("{} grade {}", "Added".bright_green(), id);
            refresh(store, Some(id)).await?;
        }
        GradesAction::Edit { id, sid, grade } => {
            let id = resolve_grade_id(store, id).await?;
            let current = store
                .get(id)
                .await
                .context("Failed to load grade")?
                .with_context(|| format!("No grade with ID {}", id))?;

            // Prompt only when no field was given on the command line.
            let interactive = sid.is_none() && grade.is_none();
            let sid = match sid {
                Some(sid) => sid,
                None if interactive => prompt_subject_id(Some(&current.subject_id))?,
                None => current.subject_id.clone(),
            };
            let grade = match grade {
                Some(grade) => grade,
                None if interactive => prompt_grade(Some(&current.grade))?,
                None => current.grade.clone(),
            };

            let edited = current.with_subject_id(sid).with_grade(grade);
            let rows = store
                .update(&edited)
                .await
                .context("Failed to save grade")?;
            if rows == 0 {
                anyhow::bail!("Grade {} disappeared before it could be saved", id);
            }
            println!("{} grade {}", "Updated".bright_green(), id);
            refresh(store, Some(id)).await?;
        }
        GradesAction::Delete { id } => {
            let id = resolve_grade_id(store, id).await?;
            let rows = store
                .delete_by_id(id)
                .await
                .context("Failed to delete grade")?;
            if rows == 0 {
                anyhow::bail!("No grade with ID {}", id);
            }
            println!("{} grade {}", "Deleted".bright_yellow(), id);
            refresh(store, None).await?;
        }
    }

    Ok(())
}

/// Re-read the table after a mutation and show it.
async fn refresh(store: &GradeStore, highlight: Option<i64>) -> Result<()> {
    let grades = store.list_all().await.context("Failed to reload grades")?;
    println!();
    print_grades(&grades, highlight);
    Ok(())
}

async fn resolve_grade_id(store: &GradeStore, id: Option<i64>) -> Result<i64> {
    if let Some(id) = id {
        return Ok(id);
    }

    // Interactive picker
    let grades = store.list_all().await.context("Failed to load grades")?;
    if grades.is_empty() {
        anyhow::bail!("No grades recorded.");
    }

    let items: Vec<String> = grades.iter().map(format_picker_item).collect();

    let selection = FuzzySelect::new()
        .with_prompt("Select a grade")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(grades[selection].id)
}

fn prompt_subject_id(initial: Option<&str>) -> Result<String> {
    let input = Input::<String>::new()
        .with_prompt("Subject ID")
        .with_initial_text(initial.unwrap_or_default())
        .validate_with(|input: &String| parse_subject_id(input).map(|_| ()))
        .interact_text()?;
    parse_subject_id(&input).map_err(anyhow::Error::msg)
}

fn prompt_grade(initial: Option<&str>) -> Result<String> {
    let input = Input::<String>::new()
        .with_prompt("Grade")
        .with_initial_text(initial.unwrap_or_default())
        .validate_with(|input: &String| parse_grade(input).map(|_| ()))
        .interact_text()?;
    parse_grade(&input).map_err(anyhow::Error::msg)
}

fn format_picker_item(grade: &Grade) -> String {
    format!("#{:<5} {} | {}", grade.id, grade.subject_id, grade.grade)
}

fn print_grades(grades: &[Grade], highlight: Option<i64>) {
    if grades.is_empty() {
        println!("{}", "No grades recorded.".dimmed());
        return;
    }

    println!(
        "{:<8} {:<12} {}",
        "ID".dimmed(),
        "SUBJECT ID".dimmed(),
        "GRADE".dimmed(),
    );

    for g in grades {
        let line = format!("{:<8} {:<12} {}", g.id, g.subject_id, g.grade);
        if highlight == Some(g.id) {
            println!("{}", line.bright_cyan());
        } else {
            println!("{}", line);
        }
    }
}

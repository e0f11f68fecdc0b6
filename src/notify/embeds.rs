use chrono::{DateTime, Utc};

use super::{Announcement, AnnouncementField};
use crate::category::Category;
use crate::pilots;
use crate::race::{RaceModel, Session};
use crate::scoring::models::ScoreModel;

pub const RESULTS_COLOR: u32 = 0xE10600;
pub const REMINDER_COLOR: u32 = 0xFFA500;
pub const CONFIRMED_COLOR: u32 = 0x2ECC71;

/// Destinations reject embeds with more fields than this
const MAX_FIELDS: usize = 25;

fn numbered(codes: &[String]) -> String {
    codes
        .iter()
        .enumerate()
        .map(|(index, code)| format!("{}. {}", index + 1, pilots::display_name(code)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn names(codes: &[String]) -> String {
    codes
        .iter()
        .map(|code| pilots::display_name(code))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_start(start: DateTime<Utc>) -> String {
    start.format("%a %d %b %H:%M UTC").to_string()
}

/// Official result of a category and the points it awarded, best first
pub fn results_announcement(
    race: &RaceModel,
    category: Category,
    actual: &[String],
    scores: &[ScoreModel],
) -> Announcement {
    let mut ranked: Vec<&ScoreModel> = scores.iter().collect();
    ranked.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.username.cmp(&b.username)));

    let mut fields: Vec<AnnouncementField> = ranked
        .iter()
        .take(MAX_FIELDS)
        .map(|score| AnnouncementField {
            name: format!("{}: {} pts", score.username, score.points),
            value: score.detail.breakdown.clone(),
            inline: false,
        })
        .collect();

    if fields.is_empty() {
        fields.push(AnnouncementField {
            name: "No picks".to_string(),
            value: "Nobody bet on this category".to_string(),
            inline: false,
        });
    }

    Announcement {
        title: format!("{} · {}", race.name, category.label()),
        description: format!("Official result:\n{}", numbered(actual)),
        color: RESULTS_COLOR,
        fields,
    }
}

/// Heads-up sent once before an open session locks
pub fn session_reminder(race: &RaceModel, session: Session, starts_at: DateTime<Utc>) -> Announcement {
    let labels: Vec<&str> = Category::for_session(session)
        .into_iter()
        .map(|category| category.label())
        .collect();

    Announcement {
        title: format!("{} starts soon", session.label()),
        description: format!(
            "{} {} begins {}. Picks lock at the start.",
            race.name,
            session.label().to_lowercase(),
            format_start(starts_at)
        ),
        color: REMINDER_COLOR,
        fields: vec![AnnouncementField {
            name: "Categories closing".to_string(),
            value: labels.join(", "),
            inline: false,
        }],
    }
}

/// Public post after a user confirms picks through the wizard
pub fn picks_confirmed(username: &str, race: &RaceModel, picks: &[(Category, Vec<String>)]) -> Announcement {
    Announcement {
        title: format!("{} locked in picks", username),
        description: format!("{} (round {})", race.name, race.round),
        color: CONFIRMED_COLOR,
        fields: picks
            .iter()
            .take(MAX_FIELDS)
            .map(|(category, codes)| AnnouncementField {
                name: category.label().to_string(),
                value: names(codes),
                inline: true,
            })
            .collect(),
    }
}

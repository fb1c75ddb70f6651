//! /nuke-to-date command - Delete messages from a chosen month until now

use chrono::{DateTime, Utc};

use nuke_core::{year_choices, DeletionRequest, TimeWindow};

use crate::commands::{
    channel_id, preflight, reply_ephemeral, start_deletion, user_id, Context, Data, Error,
};
use crate::error::Result;

const YEAR_PARAMETER: &str = "year";

/// Month offered as a slash command choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// Calendar number, 1 for January
    pub fn number(self) -> u32 {
        self as u32 + 1
    }
}

/// Offer the current year and the five before it as `year` choices.
///
/// Discord sends back the index of the picked choice.
pub(crate) fn attach_year_choices(command: &mut poise::Command<Data, Error>, now: DateTime<Utc>) {
    let choices: Vec<_> = year_choices(now)
        .map(|year| poise::CommandParameterChoice {
            name: year.to_string(),
            localizations: Default::default(),
            __non_exhaustive: (),
        })
        .collect();

    if let Some(parameter) = command
        .parameters
        .iter_mut()
        .find(|p| p.name == YEAR_PARAMETER)
    {
        parameter.choices = choices;
    }
}

/// Year behind a choice index, as registered on `command`
fn chosen_year(command: &poise::Command<Data, Error>, index: u32) -> Option<i32> {
    command
        .parameters
        .iter()
        .find(|p| p.name == YEAR_PARAMETER)?
        .choices
        .get(usize::try_from(index).ok()?)?
        .name
        .parse()
        .ok()
}

/// Delete messages from now until a specified date
#[poise::command(slash_command, guild_only, rename = "nuke-to-date")]
pub async fn nuke_to_date(
    ctx: Context<'_>,
    #[description = "Select a month"] month: Month,
    #[description = "Select a year"] year: u32,
    #[description = "Type 'yes' to confirm the action"] confirm: String,
) -> Result<()> {
    if !preflight(ctx, &confirm).await? {
        return Ok(());
    }

    let Some(year) = chosen_year(ctx.command(), year) else {
        reply_ephemeral(ctx, "Select a year from the list.").await?;
        return Ok(());
    };

    // Choices are fixed at registration and may be stale after New Year
    let now = Utc::now();
    let years = year_choices(now);
    if !years.contains(&year) {
        reply_ephemeral(
            ctx,
            format!("Year must be between {} and {}.", years.start(), years.end()),
        )
        .await?;
        return Ok(());
    }

    let window = match TimeWindow::since_month(year, month.number(), now) {
        Ok(window) => window,
        Err(e) => {
            reply_ephemeral(ctx, e.to_string()).await?;
            return Ok(());
        }
    };

    let request = DeletionRequest::within(channel_id(ctx), user_id(ctx), window);
    start_deletion(ctx, request).await
}

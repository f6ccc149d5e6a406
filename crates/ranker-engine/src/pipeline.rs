// Week computation: every ranking method over one as-of-week window, blended
// into a ranked and tiered table.

use ranker_core::config::RankingConfig;
use ranker_core::season::Season;
use tracing::info;

use crate::colley::colley;
use crate::dominance::dominance;
use crate::error::{RankingError, RankingWarning};
use crate::lsq::lsq;
use crate::metrics::{aggregate_win_pct, consistency, luck, strength_of_schedule};
use crate::power::{power_scores, MethodScores};
use crate::record::team_records;
use crate::table::{assign_ranks, RankingRow, WeekRankings};
use crate::tiers::classify;

/// Compute the rankings for `week`. Only games through `week` are visible.
pub fn compute_week(
    season: &Season,
    week: u32,
    config: &RankingConfig,
) -> Result<WeekRankings, RankingError> {
    let window = season.window(week)?;
    info!(
        "ranking {} teams from {} games through week {week}",
        window.num_teams(),
        window.games().len()
    );

    let mut warnings: Vec<RankingWarning> = config
        .defaulted
        .iter()
        .map(|field| RankingWarning::ConfigDefaulted {
            field: field.clone(),
        })
        .collect();

    let records = team_records(&window);
    let lsq_outcome = lsq(&window, &config.lsq)?;
    warnings.extend(lsq_outcome.warnings.iter().cloned());

    let awp = aggregate_win_pct(&window);
    let scores = MethodScores {
        dom: dominance(&window, &config.dominance)?,
        col: colley(&window)?,
        sos: strength_of_schedule(&window, &lsq_outcome.scores, &config.sos),
        luck: luck(&window, &records, &awp, &config.luck),
        cons: consistency(&records),
        streak: records.iter().map(|r| r.streak).collect(),
        lsq: lsq_outcome.scores,
        awp,
    };
    let power = power_scores(&scores, &config.power);
    let tiers = classify(&power, &config.tiers);

    let mut rows: Vec<RankingRow> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let team = season.team(record.team_id);
            RankingRow {
                team_id: record.team_id,
                name: team.map(|t| t.name.clone()).unwrap_or_default(),
                owner: team.map(|t| t.owner.clone()).unwrap_or_default(),
                division_id: team.map_or(0, |t| t.division_id),
                wins: record.wins,
                losses: record.losses,
                points_for: record.points_for,
                points_against: record.points_against,
                awp: scores.awp[i],
                streak: record.streak,
                dom: scores.dom[i],
                lsq: scores.lsq[i],
                col: scores.col[i],
                sos: scores.sos[i],
                luck: scores.luck[i],
                cons: scores.cons[i],
                power: power[i],
                tier: tiers.tiers[i],
                power_rank: 0,
                overall_rank: 0,
                power_delta: None,
                overall_delta: None,
            }
        })
        .collect();
    assign_ranks(&mut rows);

    if !warnings.is_empty() {
        info!("week {week} finished with {} warning(s)", warnings.len());
    }
    if let Some(top) = rows.first() {
        info!("week {week} power leader: {} ({:.2})", top.name, top.power);
    }

    Ok(WeekRankings {
        year: season.year(),
        week,
        rows,
        lsq_team_ids: window.team_ids().to_vec(),
        lsq_trace: lsq_outcome.trace,
        tier_density: tiers.curve,
        warnings,
    })
}

//! Evolution and financial step storage
//!
//! Both tables carry a unique `(idea_id, priority)` pair; a second step with
//! the same priority on one idea fails at insert time.

use diesel::prelude::*;

use super::diesel_schema::{evolution_steps, financial_steps};
use super::models::{EvolutionStep, EvolutionStepChangeset, FinancialStep, FinancialStepChangeset};
use crate::types::IdeagramError;

// ============================================================================
// Evolution steps
// ============================================================================

pub fn insert_evolution_step(
    conn: &mut SqliteConnection,
    step: &EvolutionStep,
) -> Result<(), IdeagramError> {
    diesel::insert_into(evolution_steps::table)
        .values(step)
        .execute(conn)?;
    Ok(())
}

pub fn get_evolution_step(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<EvolutionStep>, IdeagramError> {
    Ok(evolution_steps::table
        .find(id)
        .first::<EvolutionStep>(conn)
        .optional()?)
}

pub fn list_evolution_steps(
    conn: &mut SqliteConnection,
    idea_id: &str,
) -> Result<Vec<EvolutionStep>, IdeagramError> {
    Ok(evolution_steps::table
        .filter(evolution_steps::idea_id.eq(idea_id))
        .order(evolution_steps::priority.asc())
        .load::<EvolutionStep>(conn)?)
}

pub fn update_evolution_step(
    conn: &mut SqliteConnection,
    id: &str,
    changes: &EvolutionStepChangeset,
) -> Result<EvolutionStep, IdeagramError> {
    diesel::update(evolution_steps::table.find(id))
        .set(changes)
        .execute(conn)?;
    Ok(evolution_steps::table.find(id).first::<EvolutionStep>(conn)?)
}

pub fn delete_evolution_step(conn: &mut SqliteConnection, id: &str) -> Result<usize, IdeagramError> {
    Ok(diesel::delete(evolution_steps::table.find(id)).execute(conn)?)
}

// ============================================================================
// Financial steps
// ============================================================================

pub fn insert_financial_step(
    conn: &mut SqliteConnection,
    step: &FinancialStep,
) -> Result<(), IdeagramError> {
    diesel::insert_into(financial_steps::table)
        .values(step)
        .execute(conn)?;
    Ok(())
}

pub fn get_financial_step(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<FinancialStep>, IdeagramError> {
    Ok(financial_steps::table
        .find(id)
        .first::<FinancialStep>(conn)
        .optional()?)
}

pub fn list_financial_steps(
    conn: &mut SqliteConnection,
    idea_id: &str,
) -> Result<Vec<FinancialStep>, IdeagramError> {
    Ok(financial_steps::table
        .filter(financial_steps::idea_id.eq(idea_id))
        .order(financial_steps::priority.asc())
        .load::<FinancialStep>(conn)?)
}

pub fn update_financial_step(
    conn: &mut SqliteConnection,
    id: &str,
    changes: &FinancialStepChangeset,
) -> Result<FinancialStep, IdeagramError> {
    diesel::update(financial_steps::table.find(id))
        .set(changes)
        .execute(conn)?;
    Ok(financial_steps::table.find(id).first::<FinancialStep>(conn)?)
}

pub fn delete_financial_step(conn: &mut SqliteConnection, id: &str) -> Result<usize, IdeagramError> {
    Ok(diesel::delete(financial_steps::table.find(id)).execute(conn)?)
}

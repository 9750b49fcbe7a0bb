//! Survival decisions.
//!
//! Rules run in strict priority and the first match wins:
//!
//! 1. age at or past the genetic limit: dead of [`Reason::MaxAge`]
//! 2. no energy and no fat left: dead of [`Reason::Starvation`]
//! 3. no energy but fat left: draw on fat, survive with zero energy
//! 4. any installed [`SurvivalRule`], in installation order
//!
//! Nothing ships as a rule in step 4; it is where an obesity check plugs in.

use crate::bean::Bean;
use crate::error::{Result, SimError};
use crate::randomness::Randomness;
use beans_data::{BeanState, Genotype, Reason, Sex, StateUpdate};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct SurvivalResult {
    pub alive: bool,
    pub reason: Option<Reason>,
    pub message: Option<String>,
}

impl SurvivalResult {
    #[must_use]
    pub fn survived() -> Self {
        Self {
            alive: true,
            reason: None,
            message: None,
        }
    }

    #[must_use]
    pub fn survived_with(message: impl Into<String>) -> Self {
        Self {
            alive: true,
            reason: None,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn died(reason: Reason, message: impl Into<String>) -> Self {
        Self {
            alive: false,
            reason: Some(reason),
            message: Some(message.into()),
        }
    }
}

/// Final record of a dead bean; never modified once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub bean: BeanState,
    pub sex: Sex,
    pub genotype: Genotype,
    pub reason: Reason,
    pub message: String,
}

/// Extra check run after the built-in rules.
pub trait SurvivalRule: std::fmt::Debug {
    /// `Some` ends evaluation with that result.
    fn check(&self, bean: &Bean, rng: &mut Randomness) -> Result<Option<SurvivalResult>>;
}

pub trait SurvivalChecker: std::fmt::Debug {
    /// May commit a new state to `bean` (fat drawn during starvation).
    fn check(&self, bean: &mut Bean, rng: &mut Randomness) -> Result<SurvivalResult>;
}

#[derive(Debug, Default)]
pub struct DefaultSurvivalChecker {
    extra_rules: Vec<Box<dyn SurvivalRule>>,
}

impl DefaultSurvivalChecker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rule(mut self, rule: Box<dyn SurvivalRule>) -> Self {
        self.extra_rules.push(rule);
        self
    }

    fn check_age(bean: &Bean) -> Option<SurvivalResult> {
        (!bean.can_survive_age())
            .then(|| SurvivalResult::died(Reason::MaxAge, "Age exceeded genetic max"))
    }

    fn check_starvation(bean: &mut Bean) -> Result<Option<SurvivalResult>> {
        if bean.energy() > 0.0 {
            return Ok(None);
        }
        let config = bean.config();
        let min_size = config.min_bean_size;
        if bean.size() <= min_size {
            return Ok(Some(SurvivalResult::died(
                Reason::Starvation,
                "No fat left to sustain (energy depleted)",
            )));
        }
        let depletion = config.starvation_base_depletion * config.starvation_depletion_multiplier;
        let new_size = (bean.size() - depletion).max(min_size);

        let mut state = bean.to_state();
        state.store(StateUpdate::new().size(new_size).energy(0.0));
        bean.update_from_state(state)?;

        Ok(Some(SurvivalResult::survived_with(format!(
            "Drew {depletion} fat due to starvation; new_size={new_size}"
        ))))
    }
}

impl SurvivalChecker for DefaultSurvivalChecker {
    fn check(&self, bean: &mut Bean, rng: &mut Randomness) -> Result<SurvivalResult> {
        if let Some(result) = Self::check_age(bean) {
            return Ok(result);
        }
        if let Some(result) = Self::check_starvation(bean)? {
            return Ok(result);
        }
        for rule in &self.extra_rules {
            if let Some(result) = rule.check(bean, rng)? {
                return Ok(result);
            }
        }
        Ok(SurvivalResult::survived())
    }
}

/// Runs a checker and keeps the log of every death it reports.
#[derive(Debug)]
pub struct SurvivalManager {
    checker: Box<dyn SurvivalChecker>,
    dead_beans: Vec<DeathRecord>,
}

impl Default for SurvivalManager {
    fn default() -> Self {
        Self::new(Box::new(DefaultSurvivalChecker::new()))
    }
}

impl SurvivalManager {
    #[must_use]
    pub fn new(checker: Box<dyn SurvivalChecker>) -> Self {
        Self {
            checker,
            dead_beans: Vec::new(),
        }
    }

    /// Checks `bean`; on death marks it dead and appends a [`DeathRecord`].
    ///
    /// A death without a reason is rejected and leaves the bean alive.
    pub fn check_and_record(
        &mut self,
        bean: &mut Bean,
        rng: &mut Randomness,
    ) -> Result<SurvivalResult> {
        let result = self.checker.check(bean, rng)?;
        if !result.alive {
            let reason = result.reason.ok_or_else(|| {
                SimError::invariant(format!("bean {} died without a reason", bean.id()))
            })?;
            bean.die();
            debug!(id = bean.id(), %reason, "Bean died");
            self.dead_beans.push(DeathRecord {
                bean: bean.to_state(),
                sex: bean.sex(),
                genotype: bean.genotype().clone(),
                reason,
                message: result.message.clone().unwrap_or_default(),
            });
        }
        Ok(result)
    }

    #[must_use]
    pub fn dead_beans(&self) -> &[DeathRecord] {
        &self.dead_beans
    }
}

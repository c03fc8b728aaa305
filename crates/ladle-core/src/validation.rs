//! Validation of caller-supplied input.
//!
//! Validation happens once, at the edge, before a draft reaches the store.
//! All checks are pure and report the first violation found.

use crate::error::ValidationError;
use crate::identity::NewIdentity;
use crate::recipe::{IngredientDraft, RecipeDraft, StepDraft};

/// Validate a registration request.
pub fn validate_identity(input: &NewIdentity) -> Result<(), ValidationError> {
    if input.email.trim().is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    if !input.email.contains('@') {
        return Err(ValidationError::InvalidEmail(input.email.clone()));
    }
    if input.display_name.trim().is_empty() {
        return Err(ValidationError::MissingField("display_name"));
    }
    if input.password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    Ok(())
}

/// Validate a recipe draft together with its child drafts.
pub fn validate_recipe_draft(
    draft: &RecipeDraft,
    ingredients: &[IngredientDraft],
    steps: &[StepDraft],
) -> Result<(), ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::MissingField("title"));
    }
    for ingredient in ingredients {
        if ingredient.name.trim().is_empty() {
            return Err(ValidationError::MissingField("ingredient.name"));
        }
        if let Some(quantity) = ingredient.quantity {
            if quantity < 0.0 {
                return Err(ValidationError::NegativeQuantity(quantity));
            }
        }
    }
    for step in steps {
        if step.description.trim().is_empty() {
            return Err(ValidationError::MissingField("step.description"));
        }
        if let Some(timer) = step.timer_minutes {
            if timer < 0 {
                return Err(ValidationError::NegativeTimer(timer));
            }
        }
    }
    Ok(())
}

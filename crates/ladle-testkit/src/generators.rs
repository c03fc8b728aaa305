//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ladle_core::{Difficulty, IngredientDraft, PageRequest, RecipeDraft, StepDraft, UserId};
use ladle_policy::{Caller, VisibilityScope};

/// Generate a user id.
pub fn user_id() -> impl Strategy<Value = UserId> {
    (1i64..10_000).prop_map(UserId::new)
}

/// Generate a caller, admin roughly one time in five.
pub fn caller() -> impl Strategy<Value = Caller> {
    (user_id(), 0u8..5).prop_map(|(user_id, roll)| Caller {
        user_id,
        is_admin: roll == 0,
    })
}

/// Generate a visibility scope.
pub fn visibility_scope() -> impl Strategy<Value = VisibilityScope> {
    prop_oneof![
        Just(VisibilityScope::Unrestricted),
        user_id().prop_map(VisibilityScope::CallerScoped),
        Just(VisibilityScope::PublicOnly),
    ]
}

/// Generate a difficulty.
pub fn difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Medium),
        Just(Difficulty::Hard),
    ]
}

/// Generate a non-blank title.
pub fn title() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,40}".prop_map(String::from)
}

/// Generate a valid page request.
pub fn page_request() -> impl Strategy<Value = PageRequest> {
    (0u32..100, 1u32..50).prop_map(|(page, page_size)| PageRequest { page, page_size })
}

/// Generate a valid recipe draft.
pub fn recipe_draft() -> impl Strategy<Value = RecipeDraft> {
    (
        title(),
        ".{0,80}",
        difficulty(),
        "[a-z]{0,12}",
        prop::collection::vec("[a-z]{1,10}", 0..5),
        prop::option::of(any::<bool>()),
    )
        .prop_map(
            |(title, description, difficulty, category, tags, is_private)| RecipeDraft {
                title,
                description,
                difficulty,
                category,
                tags,
                is_private,
            },
        )
}

/// Generate a valid ingredient draft.
pub fn ingredient_draft() -> impl Strategy<Value = IngredientDraft> {
    (
        "[a-z]{1,16}",
        prop::option::of(0.0f64..1000.0),
        "[a-z]{0,8}",
        0i32..100,
    )
        .prop_map(|(name, quantity, unit, sort_order)| IngredientDraft {
            name,
            quantity,
            unit,
            note: String::new(),
            sort_order,
        })
}

/// Generate a valid step draft.
pub fn step_draft() -> impl Strategy<Value = StepDraft> {
    ("[a-z][a-z ]{0,39}", 1i32..50, prop::option::of(0i64..240)).prop_map(
        |(description, step_number, timer_minutes)| StepDraft {
            step_number,
            description,
            image_url: String::new(),
            timer_minutes,
            sort_order: step_number,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladle_core::validate_recipe_draft;

    proptest! {
        #[test]
        fn generated_drafts_pass_validation(
            draft in recipe_draft(),
            ingredients in prop::collection::vec(ingredient_draft(), 0..5),
            steps in prop::collection::vec(step_draft(), 0..5),
        ) {
            prop_assert!(validate_recipe_draft(&draft, &ingredients, &steps).is_ok());
        }

        #[test]
        fn scope_for_caller_matches_flags(c in caller()) {
            let scope = VisibilityScope::for_caller(Some(&c));
            if c.is_admin {
                prop_assert_eq!(scope, VisibilityScope::Unrestricted);
            } else {
                prop_assert_eq!(scope, VisibilityScope::CallerScoped(c.user_id));
            }
        }

        #[test]
        fn page_offset_never_overflows(page in page_request()) {
            let _ = page.offset();
            prop_assert!(page.page_size > 0);
        }
    }
}

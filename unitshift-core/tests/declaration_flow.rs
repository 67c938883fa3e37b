//! End-to-end declaration flow through the policy state machine.
//!
//! These tests drive `DeclarationPolicy` the way a hosting pipeline would:
//! one context per document, every declaration offered with its identities,
//! outcomes applied by the test itself.

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use unitshift_core::{
    ApplyMode, BlacklistPolicy, DeclarationId, DeclarationOutcome, DeclarationPolicy,
    DeclarationView, RuleId, SkipReason,
};
use unitshift_rewrite::ConversionRule;
use unitshift_types::{
    DocumentInput, ExcludeSpec, Pattern, RewriteConfig, RewriteOptions, RootValue,
};

/// The design-width-640 rem root from the platform table: (20 / 1.17) * 2.
const REM_ROOT_640: f64 = 20.0 / 1.17 * 2.0;

fn policy_with(options: RewriteOptions) -> DeclarationPolicy {
    let defaults = RewriteConfig {
        root_value: RootValue::Value(REM_ROOT_640),
        ..Default::default()
    };
    let config = options.merge_over(&defaults);
    DeclarationPolicy::new(&config, &["px"], ConversionRule::DivideByRoot).unwrap()
}

fn decl<'a>(id: u64, prop: &'a str, value: &'a str, selector: Option<&'a str>) -> DeclarationView<'a> {
    DeclarationView {
        id: DeclarationId(id),
        prop,
        value,
        selector,
        rule: None,
        siblings: &[],
    }
}

#[test]
fn rewrites_px_declarations_to_rem() {
    let policy = policy_with(RewriteOptions::default());
    let mut ctx = policy.begin_document(DocumentInput::anonymous());

    let outcome = policy.evaluate(&mut ctx, &decl(1, "margin", "0 0 20px", Some("h1")));
    assert_eq!(outcome.new_value(), Some("0 0 0.585rem"));
    assert_eq!(
        outcome,
        DeclarationOutcome::Rewritten {
            value: "0 0 0.585rem".to_string(),
            mode: ApplyMode::Replace,
        }
    );

    let outcome = policy.evaluate(&mut ctx, &decl(2, "font-size", "32px", Some("h1")));
    assert_eq!(outcome.new_value(), Some("0.936rem"));
}

#[test]
fn rewritten_output_is_a_fixed_point() {
    let policy = policy_with(RewriteOptions::default());
    let mut ctx = policy.begin_document(DocumentInput::anonymous());

    let first = policy.evaluate(&mut ctx, &decl(1, "margin", "0 0 20px", Some("h1")));
    let rewritten = first.new_value().unwrap().to_string();

    // Second pass over the already-converted value: the scanner only knows
    // the source unit, so nothing matches.
    let second = policy.evaluate(&mut ctx, &decl(2, "margin", &rewritten, Some("h1")));
    assert_eq!(second.skip_reason(), Some(SkipReason::NoSourceUnit));
}

#[test]
fn zero_stays_unitless_and_unmatched_zero_stays_zero() {
    let policy = policy_with(RewriteOptions::default());
    let mut ctx = policy.begin_document(DocumentInput::anonymous());

    let outcome = policy.evaluate(&mut ctx, &decl(1, "margin", "0px 0", Some("h1")));
    assert_eq!(outcome.new_value(), Some("0 0"));
}

#[test]
fn disabled_document_skips_every_declaration() {
    let policy = policy_with(RewriteOptions::default());
    let mut ctx = policy.begin_document(DocumentInput::anonymous());
    ctx.set_disabled(true);

    let outcome = policy.evaluate(&mut ctx, &decl(1, "margin", "20px", Some("h1")));
    assert_eq!(outcome.skip_reason(), Some(SkipReason::DocumentDisabled));
}

#[test]
fn excluded_file_skips_every_declaration() {
    let policy = policy_with(RewriteOptions {
        exclude: Some(ExcludeSpec::Patterns(vec![Pattern::from("node_modules")])),
        ..Default::default()
    });
    let mut ctx = policy.begin_document(DocumentInput::from_path("pkg/node_modules/lib.css"));
    assert!(ctx.is_excluded());

    let outcome = policy.evaluate(&mut ctx, &decl(1, "margin", "20px", Some("h1")));
    assert_eq!(outcome.skip_reason(), Some(SkipReason::FileExcluded));

    // A path outside the exclude list is processed normally.
    let mut ctx = policy.begin_document(DocumentInput::from_path("src/app.css"));
    let outcome = policy.evaluate(&mut ctx, &decl(1, "margin", "20px", Some("h1")));
    assert!(outcome.should_rewrite());
}

#[test]
fn declarations_without_the_source_unit_are_skipped_cheaply() {
    let policy = policy_with(RewriteOptions::default());
    let mut ctx = policy.begin_document(DocumentInput::anonymous());

    let outcome = policy.evaluate(&mut ctx, &decl(1, "margin", "2rem auto", Some("h1")));
    assert_eq!(outcome.skip_reason(), Some(SkipReason::NoSourceUnit));

    // Case-sensitive by default: `40PX` is not the source unit.
    let outcome = policy.evaluate(&mut ctx, &decl(2, "width", "40PX", Some("h1")));
    assert_eq!(outcome.skip_reason(), Some(SkipReason::NoSourceUnit));
}

#[test]
fn each_declaration_is_processed_once() {
    let policy = policy_with(RewriteOptions::default());
    let mut ctx = policy.begin_document(DocumentInput::anonymous());

    let d = decl(7, "margin", "20px", Some("h1"));
    assert!(policy.evaluate(&mut ctx, &d).should_rewrite());
    assert_eq!(
        policy.evaluate(&mut ctx, &d).skip_reason(),
        Some(SkipReason::AlreadyProcessed)
    );
}

#[test]
fn prop_list_gates_properties() {
    let policy = policy_with(RewriteOptions {
        prop_list: Some(vec![Pattern::from("margin*"), Pattern::from("!margin-left")]),
        ..Default::default()
    });
    let mut ctx = policy.begin_document(DocumentInput::anonymous());

    assert!(policy
        .evaluate(&mut ctx, &decl(1, "margin-top", "20px", Some("h1")))
        .should_rewrite());
    assert_eq!(
        policy
            .evaluate(&mut ctx, &decl(2, "margin-left", "20px", Some("h1")))
            .skip_reason(),
        Some(SkipReason::PropListMiss)
    );
    assert_eq!(
        policy
            .evaluate(&mut ctx, &decl(3, "font-size", "20px", Some("h1")))
            .skip_reason(),
        Some(SkipReason::PropListMiss)
    );
}

#[test]
fn blacklisted_selector_skips_under_skip_policy() {
    let policy = policy_with(RewriteOptions {
        selector_black_list: Some(vec![Pattern::regex("^body$").unwrap()]),
        ..Default::default()
    });
    let mut ctx = policy.begin_document(DocumentInput::anonymous());

    assert_eq!(
        policy
            .evaluate(&mut ctx, &decl(1, "margin", "20px", Some("body")))
            .skip_reason(),
        Some(SkipReason::SelectorBlacklisted)
    );
    // Anchored regex: only the exact selector is exempt.
    assert!(policy
        .evaluate(&mut ctx, &decl(2, "margin", "20px", Some("body .child")))
        .should_rewrite());
    assert!(policy
        .evaluate(&mut ctx, &decl(3, "margin", "20px", Some(".class-body")))
        .should_rewrite());
    // No selector context at all: blacklist not applicable, rewrite proceeds.
    assert!(policy
        .evaluate(&mut ctx, &decl(4, "margin", "20px", None))
        .should_rewrite());
}

#[test]
fn blacklisted_selector_preserves_unit_under_preserve_policy() {
    let policy = policy_with(RewriteOptions {
        selector_black_list: Some(vec![Pattern::from(".native")]),
        ..Default::default()
    })
    .with_blacklist_policy(BlacklistPolicy::PreserveUnit("ch".to_string()));
    let mut ctx = policy.begin_document(DocumentInput::anonymous());

    let outcome = policy.evaluate(&mut ctx, &decl(1, "margin", "10px 20px", Some(".native")));
    assert_eq!(outcome.new_value(), Some("10ch 20ch"));

    // Non-blacklisted declarations still convert normally.
    let outcome = policy.evaluate(&mut ctx, &decl(2, "margin", "20px", Some(".plain")));
    assert_eq!(outcome.new_value(), Some("0.585rem"));
}

#[test]
fn blacklist_verdict_is_cached_per_rule() {
    let policy = policy_with(RewriteOptions {
        selector_black_list: Some(vec![Pattern::from("body")]),
        ..Default::default()
    });
    let mut ctx = policy.begin_document(DocumentInput::anonymous());
    let rule = RuleId(42);

    let blacklisted = DeclarationView {
        rule: Some(rule),
        ..decl(1, "margin", "20px", Some("body"))
    };
    assert_eq!(
        policy.evaluate(&mut ctx, &blacklisted).skip_reason(),
        Some(SkipReason::SelectorBlacklisted)
    );

    // Same rule identity: the memoized verdict applies even though the
    // selector text offered here would not match.
    let same_rule = DeclarationView {
        rule: Some(rule),
        ..decl(2, "margin", "20px", Some(".other"))
    };
    assert_eq!(
        policy.evaluate(&mut ctx, &same_rule).skip_reason(),
        Some(SkipReason::SelectorBlacklisted)
    );

    // A fresh document gets a fresh cache.
    let mut ctx = policy.begin_document(DocumentInput::anonymous());
    let other_rule = DeclarationView {
        rule: Some(RuleId(43)),
        ..decl(3, "margin", "20px", Some(".other"))
    };
    assert!(policy.evaluate(&mut ctx, &other_rule).should_rewrite());
}

#[test]
fn min_value_cutoff_leaves_small_values_in_place() {
    let policy = policy_with(RewriteOptions {
        min_value: Some(2.0),
        ..Default::default()
    });
    let mut ctx = policy.begin_document(DocumentInput::anonymous());

    // `1px` survives untouched; since nothing changed, the whole
    // declaration is a no-op.
    let outcome = policy.evaluate(&mut ctx, &decl(1, "border", "1px", Some("h1")));
    assert_eq!(outcome.skip_reason(), Some(SkipReason::NoChange));

    // Mixed values convert only the large magnitude.
    let outcome = policy.evaluate(&mut ctx, &decl(2, "margin", "1px 10px", Some("h1")));
    assert_eq!(outcome.new_value(), Some("1px 0.2925rem"));
}

#[test]
fn duplicate_sibling_declaration_is_not_recreated() {
    let policy = policy_with(RewriteOptions::default());
    let mut ctx = policy.begin_document(DocumentInput::anonymous());

    let siblings = [
        unitshift_core::Sibling {
            prop: "margin",
            value: "20px",
        },
        unitshift_core::Sibling {
            prop: "margin",
            value: "0.585rem",
        },
    ];
    let d = DeclarationView {
        siblings: &siblings,
        ..decl(1, "margin", "20px", Some("h1"))
    };
    assert_eq!(
        policy.evaluate(&mut ctx, &d).skip_reason(),
        Some(SkipReason::DuplicateSibling)
    );
}

#[test]
fn clone_after_mode_when_replace_is_off() {
    let policy = policy_with(RewriteOptions {
        replace: Some(false),
        ..Default::default()
    });
    let mut ctx = policy.begin_document(DocumentInput::anonymous());

    let outcome = policy.evaluate(&mut ctx, &decl(1, "margin", "20px", Some("h1")));
    assert_eq!(
        outcome,
        DeclarationOutcome::Rewritten {
            value: "0.585rem".to_string(),
            mode: ApplyMode::CloneAfter,
        }
    );
}

#[test]
fn protected_spans_survive_byte_for_byte() {
    let policy = policy_with(RewriteOptions::default());
    let mut ctx = policy.begin_document(DocumentInput::anonymous());

    let value = r#"url(20px.svg) "20px" var(--w-20px) 20px"#;
    let outcome = policy.evaluate(&mut ctx, &decl(1, "background", value, Some("h1")));
    assert_eq!(
        outcome.new_value(),
        Some(r#"url(20px.svg) "20px" var(--w-20px) 0.585rem"#)
    );
}

#[test]
fn media_params_rewrite_only_when_opted_in() {
    let policy = policy_with(RewriteOptions::default());
    let ctx = policy.begin_document(DocumentInput::anonymous());
    assert_eq!(policy.rewrite_media_params(&ctx, "(min-width: 640px)"), None);

    let policy = policy_with(RewriteOptions {
        media_query: Some(true),
        ..Default::default()
    });
    let ctx = policy.begin_document(DocumentInput::anonymous());
    assert_eq!(
        policy.rewrite_media_params(&ctx, "(min-width: 640px)"),
        Some("(min-width: 18.72rem)".to_string())
    );
    assert_eq!(policy.rewrite_media_params(&ctx, "(orientation: landscape)"), None);
}

#[test]
fn root_value_function_runs_once_per_document() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let options = RewriteOptions {
        root_value: Some(RootValue::per_document(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            16.0
        })),
        ..Default::default()
    };
    let policy = policy_with(options);

    let mut ctx = policy.begin_document(DocumentInput::anonymous());
    for id in 0..5 {
        let _ = policy.evaluate(&mut ctx, &decl(id, "margin", "16px", Some("h1")));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.root_value(), 16.0);

    let _ctx2 = policy.begin_document(DocumentInput::anonymous());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

//! Question resolution and question bank tests.

mod common;

use campaign_qa::models::{KnownEntities, Metric, QuestionCategory, RankOrder, Scope};
use campaign_qa::question::{detect_metric, QuestionResolver, RankSubject, Resolution};
use campaign_qa::QuestionBank;
use common::sample_snapshot;

fn resolver() -> QuestionResolver {
    QuestionResolver::new(&sample_snapshot().known_entities())
}

fn numeric(metric: Metric, scope: Scope) -> Resolution {
    Resolution::Numeric { metric, scope }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[test]
fn overall_metric_synonyms() {
    let r = resolver();
    assert_eq!(r.resolve("How much budget did we use?"), numeric(Metric::Spend, Scope::Overall));
    assert_eq!(r.resolve("What earnings did we make?"), numeric(Metric::Revenue, Scope::Overall));
    assert_eq!(r.resolve("How many total views?"), numeric(Metric::Impressions, Scope::Overall));
    assert_eq!(
        r.resolve("What is the overall return on ad spend?"),
        numeric(Metric::Roas, Scope::Overall)
    );
    assert_eq!(
        r.resolve("What is our cost per acquisition?"),
        numeric(Metric::Cpa, Scope::Overall)
    );
}

#[test]
fn platform_scope_handles_possessive_and_case() {
    let r = resolver();
    assert_eq!(
        r.resolve("What is META's CTR?"),
        numeric(Metric::Ctr, Scope::Platform("Meta".into()))
    );
    assert_eq!(
        r.resolve("How many clicks did Dv360 get?"),
        numeric(Metric::Clicks, Scope::Platform("Dv360".into()))
    );
}

#[test]
fn platform_names_match_whole_words_only() {
    let r = resolver();
    assert_eq!(
        r.resolve("What is the metadata spend?"),
        numeric(Metric::Spend, Scope::Overall)
    );
}

#[test]
fn campaign_scope_prefers_longest_name() {
    let entities = KnownEntities::new(
        ["Meta"],
        ["FreshNest Summer", "FreshNest Summer Grilling"],
    );
    let r = QuestionResolver::new(&entities);
    assert_eq!(
        r.resolve("How much did we spend on FreshNest Summer Grilling?"),
        numeric(Metric::Spend, Scope::Campaign("FreshNest Summer Grilling".into()))
    );
    assert_eq!(
        r.resolve("How much did we spend on FreshNest Summer?"),
        numeric(Metric::Spend, Scope::Campaign("FreshNest Summer".into()))
    );
}

#[test]
fn comparative_questions() {
    let r = resolver();
    assert_eq!(
        r.resolve("Which platform performed best?"),
        Resolution::Comparative {
            subject: RankSubject::Platforms,
            metric: Metric::Roas,
            order: RankOrder::Highest,
        }
    );
    assert_eq!(
        r.resolve("Which campaign spent the most?"),
        Resolution::Comparative {
            subject: RankSubject::Campaigns,
            metric: Metric::Spend,
            order: RankOrder::Highest,
        }
    );
}

#[test]
fn comparative_order_follows_cue_and_metric() {
    let r = resolver();
    let order = |q: &str| match r.resolve(q) {
        Resolution::Comparative { order, .. } => order,
        other => panic!("{q:?} resolved to {other:?}"),
    };
    assert_eq!(order("Which platform had the lowest CPA?"), RankOrder::Lowest);
    assert_eq!(order("Which campaign got the least clicks?"), RankOrder::Lowest);
    assert_eq!(order("Which platform had the highest CPC?"), RankOrder::Highest);
    // "Best" means cheapest for cost metrics.
    assert_eq!(order("Which platform had the best CPA?"), RankOrder::Lowest);
    assert_eq!(order("Which platform had the worst CPM?"), RankOrder::Highest);
    assert_eq!(order("Which platform performed worst?"), RankOrder::Lowest);
}

#[test]
fn cue_words_inside_entity_names_are_ignored() {
    let entities = KnownEntities::new(["Meta"], ["Top Sellers", "Growth Strategy"]);
    let r = QuestionResolver::new(&entities);
    assert_eq!(
        r.resolve("How much did we spend on Top Sellers?"),
        numeric(Metric::Spend, Scope::Campaign("Top Sellers".into()))
    );
    assert_eq!(
        r.resolve("What is the ROAS for Growth Strategy?"),
        numeric(Metric::Roas, Scope::Campaign("Growth Strategy".into()))
    );
    // A cue outside the name still counts.
    assert_eq!(
        r.resolve("What strategy should we use for Top Sellers?"),
        Resolution::OpenEnded {
            scope: Scope::Campaign("Top Sellers".into())
        }
    );
}

#[test]
fn comparative_words_match_whole_words_only() {
    let r = resolver();
    assert_eq!(
        r.resolve("What is our topline revenue?"),
        numeric(Metric::Revenue, Scope::Overall)
    );
    assert_eq!(
        r.resolve("What is our most recent total spend?"),
        numeric(Metric::Spend, Scope::Overall)
    );
}

#[test]
fn confirmation_wording_needs_no_metric() {
    let r = resolver();
    assert_eq!(
        r.resolve("What is this month's total spend?"),
        numeric(Metric::Spend, Scope::Overall)
    );
    assert_eq!(
        r.resolve("Is this data accurate?"),
        Resolution::OpenEnded {
            scope: Scope::Overall
        }
    );
}

#[test]
fn entity_count_questions() {
    let r = resolver();
    let platforms = r.resolve("How many platforms do we have?");
    assert_eq!(platforms, numeric(Metric::PlatformCount, Scope::Overall));
    assert_eq!(platforms.expected(&sample_snapshot()), Some(4.0));
    let campaigns = r.resolve("What is the number of campaigns?");
    assert_eq!(campaigns.expected(&sample_snapshot()), Some(3.0));
}

#[test]
fn open_ended_questions_keep_scope() {
    let r = resolver();
    assert_eq!(
        r.resolve("What insights do you have about Meta?"),
        Resolution::OpenEnded {
            scope: Scope::Platform("Meta".into())
        }
    );
    // Summary wording with no metric is open-ended too.
    assert_eq!(
        r.resolve("How is Amazon performing?"),
        Resolution::OpenEnded {
            scope: Scope::Platform("Amazon".into())
        }
    );
}

#[test]
fn unrecognized_questions() {
    let r = resolver();
    assert_eq!(r.resolve("Hello there"), Resolution::Unrecognized);
    assert_eq!(r.resolve("   "), Resolution::Unrecognized);
    assert_eq!(r.resolve("?!"), Resolution::Unrecognized);
    assert_eq!(Resolution::Unrecognized.expected(&sample_snapshot()), None);
}

#[test]
fn expected_value_for_unknown_bucket_is_none() {
    let resolution = numeric(Metric::Spend, Scope::Platform("Snapchat".into()));
    assert_eq!(resolution.expected(&sample_snapshot()), None);
}

#[test]
fn detect_metric_priority() {
    assert_eq!(detect_metric("What was the ROI?"), Some(Metric::Roas));
    assert_eq!(detect_metric("spend per click"), Some(Metric::Spend));
    assert_eq!(detect_metric("nothing relevant"), None);
}

// ---------------------------------------------------------------------------
// QuestionBank
// ---------------------------------------------------------------------------

#[test]
fn bank_has_every_family() {
    let bank = QuestionBank::generate(&sample_snapshot().known_entities());
    assert_eq!(bank.in_category(QuestionCategory::BasicMetrics).len(), 24);
    assert_eq!(bank.in_category(QuestionCategory::Comparative).len(), 12);
    assert_eq!(bank.in_category(QuestionCategory::Strategic).len(), 12);
    // 17 questions per entity: 4 platforms, 3 campaigns.
    assert_eq!(bank.in_category(QuestionCategory::PlatformSpecific).len(), 68);
    assert_eq!(bank.in_category(QuestionCategory::CampaignSpecific).len(), 51);
    assert_eq!(bank.len(), 167);
}

#[test]
fn every_bank_question_resolves_to_its_category() {
    let entities = sample_snapshot().known_entities();
    let bank = QuestionBank::generate(&entities);
    let r = QuestionResolver::new(&entities);
    for question in &bank {
        assert_eq!(
            r.resolve(&question.text).category(),
            question.category,
            "{:?}",
            question.text
        );
    }
}

#[test]
fn seeded_sample_is_reproducible() {
    let bank = QuestionBank::generate(&sample_snapshot().known_entities());
    let a = bank.sample(10, Some(42));
    let b = bank.sample(10, Some(42));
    assert_eq!(a, b);
    assert_eq!(a.len(), 10);
    let all = bank.texts();
    assert!(a.iter().all(|q| all.contains(&q.text.as_str())));
}

#[test]
fn oversized_sample_returns_whole_bank() {
    let bank = QuestionBank::generate(&sample_snapshot().known_entities());
    let sample = bank.sample(10_000, None);
    assert_eq!(sample, bank);
}

#[test]
fn empty_entities_still_yield_general_questions() {
    let bank = QuestionBank::generate(&KnownEntities::default());
    assert_eq!(bank.len(), 48);
    assert!(bank.in_category(QuestionCategory::PlatformSpecific).is_empty());
}

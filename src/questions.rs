//! Question bank: the families of questions a QA run asks the service.
//!
//! Questions are generated from the known platform and campaign names, each
//! tagged with the category the resolver is expected to put it in, so a run
//! can report accuracy per family.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::models::{KnownEntities, Metric, QuestionCategory};

/// Metrics asked about for each platform and campaign.
const ENTITY_METRICS: &[Metric] = &[
    Metric::Spend,
    Metric::Revenue,
    Metric::Impressions,
    Metric::Clicks,
    Metric::Conversions,
    Metric::Ctr,
    Metric::Roas,
    Metric::Cpc,
    Metric::Cpm,
    Metric::Cpa,
];

const BASIC_QUESTIONS: &[&str] = &[
    "How much did we spend in total?",
    "What is our total spend?",
    "How much budget did we use?",
    "How much money did we invest?",
    "What is our total revenue?",
    "How much revenue did we generate?",
    "What is our total income?",
    "What earnings did we make?",
    "How many impressions did we get?",
    "How many total views?",
    "How many clicks did we get?",
    "How many interactions did we receive?",
    "What is the total number of conversions?",
    "What is our overall CTR?",
    "What is the overall click-through rate?",
    "What is our overall ROAS?",
    "What is the overall return on ad spend?",
    "What is the average CPC?",
    "What is our cost per click?",
    "What is the average CPM?",
    "What is the average CPA?",
    "What is our cost per acquisition?",
    "How many platforms do we have?",
    "How many campaigns are running?",
];

const COMPARATIVE_QUESTIONS: &[&str] = &[
    "Which platform performed best?",
    "Which platform had the highest ROAS?",
    "Which platform had the highest CTR?",
    "Which platform spent the most?",
    "Which platform generated the most revenue?",
    "Which platform got the most impressions?",
    "Which platform is the most profitable?",
    "Which campaign performed best?",
    "Which campaign had the highest ROAS?",
    "Which campaign spent the most?",
    "What are the top 3 campaigns by revenue?",
    "Rank the platforms by spend",
];

const STRATEGIC_QUESTIONS: &[&str] = &[
    "What did we learn from this campaign?",
    "What recommendations do you have?",
    "How can I improve performance?",
    "What should I optimize?",
    "Where should I put more money?",
    "What insights can you provide?",
    "What are the key takeaways?",
    "How can I increase revenue?",
    "What worked well?",
    "What budget optimization do you recommend?",
    "Is this data accurate?",
    "Can you verify these results?",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub category: QuestionCategory,
}

impl Question {
    fn new(text: impl Into<String>, category: QuestionCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

impl AsRef<str> for Question {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

// ---------------------------------------------------------------------------
// QuestionBank
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build the full bank for the given platforms and campaigns.
    pub fn generate(entities: &KnownEntities) -> Self {
        let mut questions: Vec<Question> = BASIC_QUESTIONS
            .iter()
            .map(|q| Question::new(*q, QuestionCategory::BasicMetrics))
            .collect();

        for platform in &entities.platforms {
            for metric in ENTITY_METRICS {
                questions.extend(
                    entity_questions(platform, *metric)
                        .into_iter()
                        .map(|q| Question::new(q, QuestionCategory::PlatformSpecific)),
                );
            }
        }
        for campaign in &entities.campaigns {
            for metric in ENTITY_METRICS {
                questions.extend(
                    entity_questions(campaign, *metric)
                        .into_iter()
                        .map(|q| Question::new(q, QuestionCategory::CampaignSpecific)),
                );
            }
        }

        questions.extend(
            COMPARATIVE_QUESTIONS
                .iter()
                .map(|q| Question::new(*q, QuestionCategory::Comparative)),
        );
        questions.extend(
            STRATEGIC_QUESTIONS
                .iter()
                .map(|q| Question::new(*q, QuestionCategory::Strategic)),
        );

        Self { questions }
    }

    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.questions.iter().map(|q| q.text.as_str()).collect()
    }

    pub fn in_category(&self, category: QuestionCategory) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.category == category)
            .collect()
    }

    /// Up to `n` distinct questions picked at random, in bank order.
    ///
    /// With a `seed` the pick is reproducible.
    pub fn sample(&self, n: usize, seed: Option<u64>) -> QuestionBank {
        let all: Vec<usize> = (0..self.questions.len()).collect();
        let mut indices: Vec<usize> = match seed {
            Some(seed) => all
                .choose_multiple(&mut StdRng::seed_from_u64(seed), n)
                .copied()
                .collect(),
            None => all.choose_multiple(&mut thread_rng(), n).copied().collect(),
        };
        indices.sort_unstable();
        QuestionBank {
            questions: indices.into_iter().map(|i| self.questions[i].clone()).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a QuestionBank {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

fn entity_questions(name: &str, metric: Metric) -> Vec<String> {
    match metric {
        Metric::Spend => vec![
            format!("How much did we spend on {}?", name),
            format!("How much budget was used on {}?", name),
        ],
        Metric::Revenue => vec![
            format!("How much revenue did {} generate?", name),
            format!("What income did {} generate?", name),
        ],
        Metric::Impressions | Metric::Clicks | Metric::Conversions => {
            vec![format!("How many {} did {} get?", metric.label(), name)]
        }
        _ => vec![
            format!("What is the {} for {}?", metric.label(), name),
            format!("What is {}'s {}?", name, metric.label()),
        ],
    }
}

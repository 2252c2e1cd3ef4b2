//! Question sequencer.
//!
//! Owns the remaining pool (a private clone of the bank) and decides which
//! question is current. Every resolution (answer, skip, timeout) removes the
//! current question and draws the next one uniformly from what is left.
//! When the pool runs dry the session store is marked finished.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::store::SessionStore;
use crate::error::QuizError;
use crate::question::{Question, QuestionBank, QuestionId};

/// How the sequencer draws and presents questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerOptions {
    /// Shuffle a question's options each time it becomes current.
    pub shuffle_options: bool,
    /// Random seed for reproducible runs (None = entropy).
    pub seed: Option<u64>,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            shuffle_options: true,
            seed: None,
        }
    }
}

/// What the renderer needs to show the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    /// 1-based count of questions started so far.
    pub number: usize,
    pub total: usize,
    pub prompt: String,
    /// Options in display order.
    pub options: Vec<String>,
    pub can_skip: bool,
}

/// Result of resolving the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub resolved: QuestionId,
    /// Newly current question, `None` once the pool is exhausted.
    pub next: Option<QuestionId>,
}

impl Transition {
    pub fn finished(&self) -> bool {
        self.next.is_none()
    }
}

#[derive(Debug)]
pub struct QuestionSequencer {
    total: usize,
    pool: Vec<Question>,
    /// Index of the current question in `pool`.
    current: Option<usize>,
    shuffle_options: bool,
    rng: Mcg128Xsl64,
}

impl QuestionSequencer {
    pub fn new(bank: &QuestionBank, options: SequencerOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };

        let mut sequencer = Self {
            total: bank.len(),
            pool: bank.questions().to_vec(),
            current: None,
            shuffle_options: options.shuffle_options,
            rng,
        };
        sequencer.pick_next();
        sequencer
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn current(&self) -> Option<&Question> {
        self.current.map(|idx| &self.pool[idx])
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    /// Questions answered, skipped, or timed out so far.
    pub fn resolved(&self) -> usize {
        self.total - self.pool.len()
    }

    pub fn number(&self) -> usize {
        self.resolved() + 1
    }

    /// Skipping the last remaining question is never offered.
    pub fn can_skip(&self) -> bool {
        self.pool.len() > 1
    }

    pub fn view(&self) -> Option<QuestionView> {
        let q = self.current()?;
        Some(QuestionView {
            id: q.id,
            number: self.number(),
            total: self.total,
            prompt: q.question.clone(),
            options: q.options.clone(),
            can_skip: self.can_skip(),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record `option` as the answer to the current question and advance.
    pub fn select_answer(
        &mut self,
        store: &mut SessionStore,
        option: &str,
    ) -> Result<Transition, QuizError> {
        let q = self.current().ok_or(QuizError::AlreadyFinished)?;
        let id = q.id;
        let is_correct = q.is_correct(option);
        store.record_answer(id, option, is_correct);
        Ok(self.advance(store))
    }

    /// Answer by 0-based position in the displayed option list.
    pub fn select_option(
        &mut self,
        store: &mut SessionStore,
        index: usize,
    ) -> Result<Transition, QuizError> {
        let q = self.current().ok_or(QuizError::AlreadyFinished)?;
        let option = q
            .options
            .get(index)
            .cloned()
            .ok_or(QuizError::OptionOutOfRange {
                index: index + 1,
                len: q.options.len(),
            })?;
        self.select_answer(store, &option)
    }

    pub fn skip(&mut self, store: &mut SessionStore) -> Result<Transition, QuizError> {
        if self.current.is_none() {
            return Err(QuizError::AlreadyFinished);
        }
        if !self.can_skip() {
            return Err(QuizError::SkipUnavailable);
        }
        Ok(self.advance(store))
    }

    /// Countdown expiry: resolves the question like a skip, even the last one.
    pub fn time_out(&mut self, store: &mut SessionStore) -> Result<Transition, QuizError> {
        if self.current.is_none() {
            return Err(QuizError::AlreadyFinished);
        }
        Ok(self.advance(store))
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Caller guarantees a current question exists.
    fn advance(&mut self, store: &mut SessionStore) -> Transition {
        let idx = self.current.take().unwrap_or_default();
        let resolved = self.pool.remove(idx).id;

        if self.pool.is_empty() {
            tracing::debug!(%resolved, "question pool exhausted");
            store.mark_finished();
            return Transition {
                resolved,
                next: None,
            };
        }

        self.pick_next();
        let next = self.current().map(|q| q.id);
        tracing::debug!(%resolved, remaining = self.pool.len(), "advanced to next question");
        Transition { resolved, next }
    }

    fn pick_next(&mut self) {
        if self.pool.is_empty() {
            self.current = None;
            return;
        }
        let idx = self.rng.gen_range(0..self.pool.len());
        if self.shuffle_options {
            self.pool[idx].options.shuffle(&mut self.rng);
        }
        self.current = Some(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_question_bank() -> QuestionBank {
        QuestionBank::new(vec![
            Question::new(1, "first", ["A", "B"], "A"),
            Question::new(2, "second", ["C", "D"], "C"),
        ])
        .unwrap()
    }

    fn seeded(seed: u64) -> SequencerOptions {
        SequencerOptions {
            shuffle_options: true,
            seed: Some(seed),
        }
    }

    #[test]
    fn initial_state_has_current_question() {
        let bank = two_question_bank();
        let seq = QuestionSequencer::new(&bank, seeded(1));
        assert!(seq.current().is_some());
        assert_eq!(seq.remaining(), 2);
        assert_eq!(seq.number(), 1);
        assert!(seq.can_skip());
    }

    #[test]
    fn skip_is_withheld_on_last_question() {
        let bank = two_question_bank();
        let mut store = SessionStore::new();
        let mut seq = QuestionSequencer::new(&bank, seeded(2));

        let t = seq.skip(&mut store).unwrap();
        assert!(!t.finished());
        assert!(!seq.can_skip());
        assert_eq!(seq.skip(&mut store), Err(QuizError::SkipUnavailable));
        assert_eq!(seq.remaining(), 1);
        assert!(store.state().answers.is_empty());
    }

    #[test]
    fn timeout_on_last_question_finishes() {
        let bank = two_question_bank();
        let mut store = SessionStore::new();
        let mut seq = QuestionSequencer::new(&bank, seeded(3));

        seq.time_out(&mut store).unwrap();
        let t = seq.time_out(&mut store).unwrap();
        assert!(t.finished());
        assert!(store.is_finished());
        assert!(store.state().answers.is_empty());
        assert_eq!(seq.time_out(&mut store), Err(QuizError::AlreadyFinished));
    }

    #[test]
    fn select_option_rejects_out_of_range() {
        let bank = two_question_bank();
        let mut store = SessionStore::new();
        let mut seq = QuestionSequencer::new(&bank, seeded(4));
        assert_eq!(
            seq.select_option(&mut store, 5),
            Err(QuizError::OptionOutOfRange { index: 6, len: 2 })
        );
        assert_eq!(seq.remaining(), 2);
    }

    #[test]
    fn bank_is_not_mutated_by_shuffling() {
        let bank = two_question_bank();
        let before = bank.clone();
        let mut store = SessionStore::new();
        let mut seq = QuestionSequencer::new(&bank, seeded(5));
        while seq.current().is_some() {
            seq.time_out(&mut store).unwrap();
        }
        assert_eq!(bank, before);
    }

    #[test]
    fn same_seed_gives_same_order() {
        let bank = QuestionBank::sample();
        let order = |seed| {
            let mut store = SessionStore::new();
            let mut seq = QuestionSequencer::new(&bank, seeded(seed));
            let mut ids = Vec::new();
            while let Some(q) = seq.current() {
                ids.push((q.id, q.options.clone()));
                seq.time_out(&mut store).unwrap();
            }
            ids
        };
        assert_eq!(order(99), order(99));
    }

    #[test]
    fn unshuffled_options_keep_bank_order() {
        let bank = QuestionBank::sample();
        let seq = QuestionSequencer::new(
            &bank,
            SequencerOptions {
                shuffle_options: false,
                seed: Some(7),
            },
        );
        let current = seq.current().unwrap();
        assert_eq!(current, bank.get(current.id).unwrap());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Answer(usize),
        Skip,
        Timeout,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..4).prop_map(Op::Answer),
            Just(Op::Skip),
            Just(Op::Timeout),
        ]
    }

    proptest! {
        #[test]
        fn resolved_plus_remaining_is_total(
            seed in any::<u64>(),
            ops in prop::collection::vec(op_strategy(), 0..12),
        ) {
            let bank = QuestionBank::sample();
            let total = bank.len();
            let mut store = SessionStore::new();
            let mut seq = QuestionSequencer::new(&bank, seeded(seed));

            for op in ops {
                let remaining_before = seq.remaining();
                let result = match &op {
                    Op::Answer(i) => seq.select_option(&mut store, *i),
                    Op::Skip => seq.skip(&mut store),
                    Op::Timeout => seq.time_out(&mut store),
                };

                if let (Op::Skip, Ok(_)) = (&op, &result) {
                    prop_assert!(remaining_before > 1);
                }
                if result.is_ok() {
                    prop_assert_eq!(seq.remaining(), remaining_before - 1);
                }
                prop_assert_eq!(seq.resolved() + seq.remaining(), total);
                prop_assert!(store.state().answers.len() <= seq.resolved());
                prop_assert_eq!(store.is_finished(), seq.remaining() == 0);
            }
        }

        #[test]
        fn recorded_correctness_matches_answer(seed in any::<u64>(), pick in 0usize..4) {
            let bank = QuestionBank::sample();
            let mut store = SessionStore::new();
            let mut seq = QuestionSequencer::new(&bank, seeded(seed));

            let q = seq.current().unwrap().clone();
            let option = q.options[pick % q.options.len()].clone();
            seq.select_answer(&mut store, &option).unwrap();

            let record = store.state().answer(q.id).unwrap();
            prop_assert_eq!(&record.answer, &option);
            prop_assert_eq!(record.is_correct, option == q.correct_answer);
        }

        #[test]
        fn shuffle_preserves_options(seed in any::<u64>()) {
            let bank = QuestionBank::sample();
            let mut store = SessionStore::new();
            let mut seq = QuestionSequencer::new(&bank, seeded(seed));

            while let Some(q) = seq.current() {
                let original = bank.get(q.id).unwrap();
                let mut shown = q.options.clone();
                let mut expected = original.options.clone();
                shown.sort();
                expected.sort();
                prop_assert_eq!(shown, expected);
                prop_assert_eq!(
                    q.options.iter().filter(|o| **o == q.correct_answer).count(),
                    1
                );
                seq.time_out(&mut store).unwrap();
            }
        }
    }
}

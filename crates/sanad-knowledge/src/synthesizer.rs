//! Answer synthesis: turns ranked chunks and a query into a reply.
//!
//! Four rungs, each used only when the previous one is unavailable:
//!
//! ```text
//! 1. Generated   LLM answer grounded in the supplied chunks
//! 2. RawChunks   chunks scoring above the relevance threshold, verbatim
//! 3. BestChunk   the single best chunk, whatever its score
//! 4. Apology     fixed "no information" reply in the asker's language
//! ```
//!
//! Rung 1 failing is logged and swallowed; a reply always comes back.

use sanad_core::config::{IdentityConfig, LlmConfig, RetrievalConfig};
use sanad_core::error::{Result, SanadError};
use sanad_core::traits::provider::{GenerateParams, Generator};
use sanad_core::types::{LanguageTag, QueryOutcome, RankedResult, ResponseTier};
use std::sync::Arc;

pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.5;

/// Reply used when there is nothing at all to answer from.
pub fn apology(language: LanguageTag) -> &'static str {
    match language {
        LanguageTag::Ar => "عذراً، لا توجد معلومات متاحة حالياً حول هذا الموضوع.",
        LanguageTag::En => "Sorry, no information could be found about that right now.",
    }
}

/// Who seems to be asking. Only colours the prompt wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskerRole {
    Parent,
    Student,
    JobSeeker,
    Unknown,
}

const PARENT_EN: &[&str] = &["my son", "my daughter", "my child", "my children", "kid", "kids"];
const PARENT_AR: &[&str] = &["ابني", "ابنتي", "ولدي", "بنتي", "طفلي", "أولادي", "أبنائي"];
const STUDENT_EN: &[&str] = &["student", "study", "university", "college", "graduate", "degree", "diploma"];
const STUDENT_AR: &[&str] = &["طالب", "طالبة", "دراسة", "جامعة", "كلية", "تخرج", "شهادة"];
const SEEKER_EN: &[&str] = &["job", "work", "employment", "career", "salary", "interview", "resume", "cv"];
const SEEKER_AR: &[&str] = &["وظيفة", "عمل", "توظيف", "شغل", "راتب", "مقابلة"];

/// Keyword heuristic; first matching role wins (parent, student, job seeker).
pub fn detect_asker_role(query: &str, language: LanguageTag) -> AskerRole {
    let query = query.to_lowercase();
    let (parent, student, seeker) = match language {
        LanguageTag::Ar => (PARENT_AR, STUDENT_AR, SEEKER_AR),
        LanguageTag::En => (PARENT_EN, STUDENT_EN, SEEKER_EN),
    };
    let hit = |words: &[&str]| words.iter().any(|w| query.contains(w));

    if hit(parent) {
        AskerRole::Parent
    } else if hit(student) {
        AskerRole::Student
    } else if hit(seeker) {
        AskerRole::JobSeeker
    } else {
        AskerRole::Unknown
    }
}

/// Fixed knobs of the synthesizer.
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    pub params: GenerateParams,
    /// Raw chunks must score strictly above this.
    pub relevance_threshold: f32,
    pub org_name_en: String,
    pub org_name_ar: String,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        let identity = IdentityConfig::default();
        Self {
            params: GenerateParams::default(),
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            org_name_en: identity.org_name_en,
            org_name_ar: identity.org_name_ar,
        }
    }
}

impl SynthesizerConfig {
    pub fn from_config(llm: &LlmConfig, retrieval: &RetrievalConfig, identity: &IdentityConfig) -> Self {
        Self {
            params: GenerateParams {
                model: llm.model.clone(),
                temperature: llm.temperature,
                max_tokens: llm.max_tokens,
            },
            relevance_threshold: retrieval.relevance_threshold,
            org_name_en: identity.org_name_en.clone(),
            org_name_ar: identity.org_name_ar.clone(),
        }
    }
}

/// Produces the final reply through the fallback ladder.
pub struct Synthesizer {
    generator: Option<Arc<dyn Generator>>,
    config: SynthesizerConfig,
}

impl Synthesizer {
    pub fn new(generator: Option<Arc<dyn Generator>>, config: SynthesizerConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// System instruction for the generative rung.
    pub fn system_prompt(&self, language: LanguageTag) -> String {
        match language {
            LanguageTag::Ar => format!(
                "أنت مساعد ذكي ومفيد في {}. أنت متخصص في:\n\
                 - مساعدة الآباء في البحث عن فرص عمل لأبنائهم\n\
                 - مساعدة الطلاب في التوجيه المهني والاستشارات\n\
                 - مساعدة العملاء في خدمات التوظيف والبحث عن وظائف\n\n\
                 أجب بطريقة طبيعية ومحادثة، بلغة عربية واضحة ومفيدة. استخدم المعلومات المتاحة للإجابة على الأسئلة. \
                 إذا لم تجد معلومات كافية، كن مفيداً وقدم نصائح عامة.",
                self.config.org_name_ar
            ),
            LanguageTag::En => format!(
                "You are a helpful and intelligent assistant at {}. You specialize in:\n\
                 - Helping parents find job opportunities for their children\n\
                 - Assisting students with career guidance and counseling\n\
                 - Supporting clients with employment services and job search\n\n\
                 Respond naturally and conversationally, in clear and helpful English. \
                 Use the available information to answer questions. \
                 If you don't have enough information, be helpful and provide general guidance.",
                self.config.org_name_en
            ),
        }
    }

    /// User instruction: context block (when any) followed by the literal query.
    pub fn user_prompt(&self, query: &str, chunks: &[RankedResult], language: LanguageTag) -> String {
        let context = join_texts(chunks.iter());
        let role_hint = role_hint(detect_asker_role(query, language), language);

        if context.is_empty() {
            format!("Question: {query}{role_hint}\n\nPlease provide a helpful, natural response.")
        } else {
            format!(
                "Context information:\n{context}\n\nQuestion: {query}{role_hint}\n\n\
                 Please provide a natural, conversational answer based on the context."
            )
        }
    }

    /// Rung 1 on its own. Fails with `Upstream` when no generator is
    /// configured, the call errors, or the model returns nothing.
    pub async fn generate(&self, query: &str, chunks: &[RankedResult], language: LanguageTag) -> Result<String> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| SanadError::Upstream("no generative model configured".into()))?;

        let system = self.system_prompt(language);
        let user = self.user_prompt(query, chunks, language);
        tracing::info!(
            "Generating {} reply with {} context chunk(s) via {}",
            language,
            chunks.len(),
            generator.name()
        );

        let text = generator.complete(&system, &user, &self.config.params).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(SanadError::Upstream(format!("{}: empty response", generator.name())));
        }
        Ok(text.to_string())
    }

    /// Walk the ladder. `chunks` are the top-ranked results, best first.
    pub async fn synthesize(&self, query: &str, chunks: &[RankedResult], language: LanguageTag) -> QueryOutcome {
        match self.generate(query, chunks, language).await {
            Ok(reply) => {
                tracing::info!("Generated reply ({} chars)", reply.chars().count());
                return QueryOutcome { reply, tier: ResponseTier::Generated };
            }
            Err(e) => tracing::warn!("Generation failed, falling back to retrieved text: {e}"),
        }
        self.extractive(chunks, language)
    }

    /// Rungs 2 to 4, no model involved.
    pub fn extractive(&self, chunks: &[RankedResult], language: LanguageTag) -> QueryOutcome {
        let relevant = join_texts(
            chunks
                .iter()
                .filter(|r| r.similarity > self.config.relevance_threshold),
        );
        if !relevant.is_empty() {
            return QueryOutcome { reply: relevant, tier: ResponseTier::RawChunks };
        }

        let best = chunks.iter().max_by(|a, b| {
            a.similarity
                .partial_cmp(&b.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                // Prefer the earlier chunk on ties.
                .then(b.chunk.index.cmp(&a.chunk.index))
        });
        if let Some(best) = best {
            return QueryOutcome {
                reply: best.chunk.text.clone(),
                tier: ResponseTier::BestChunk,
            };
        }

        QueryOutcome {
            reply: apology(language).to_string(),
            tier: ResponseTier::Apology,
        }
    }
}

fn role_hint(role: AskerRole, language: LanguageTag) -> &'static str {
    match (role, language) {
        (AskerRole::Parent, LanguageTag::En) => {
            "\n\nThe person asking appears to be a parent looking out for their child."
        }
        (AskerRole::Parent, LanguageTag::Ar) => "\n\nيبدو أن السائل ولي أمر يبحث عن فرصة لابنه أو ابنته.",
        (AskerRole::Student, LanguageTag::En) => "\n\nThe person asking appears to be a student.",
        (AskerRole::Student, LanguageTag::Ar) => "\n\nيبدو أن السائل طالب.",
        (AskerRole::JobSeeker, LanguageTag::En) => "\n\nThe person asking appears to be looking for work.",
        (AskerRole::JobSeeker, LanguageTag::Ar) => "\n\nيبدو أن السائل يبحث عن عمل.",
        (AskerRole::Unknown, _) => "",
    }
}

fn join_texts<'a>(results: impl Iterator<Item = &'a RankedResult>) -> String {
    results
        .map(|r| r.chunk.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

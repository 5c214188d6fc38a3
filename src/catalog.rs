use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Service catalog — single source of truth for the app surface AND the
// persisted documents. Wire names match legacy data exports, so a data.json
// produced by the web build still loads.
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceKind {
    General,
    Poem,
    Story,
    Horoscope,
    PersonalityAnalysis,
    Summary,
    WritingImprover,
    IdeaGenerator,
    EmailWriter,
    CvWriter,
    SocialMediaPost,
    RelationshipAnalysis,
    Quiz,
    NameGenerator,
    QuoteOfTheDay,
    DreamAnalysis,
    VideoIdeaGenerator,
    LyricGenerator,
    QuoteGenerator,
    DialogueGenerator,
    ExamGenerator,
    ConceptExplainer,
    ProjectAnalysis,
    TextAnalysis,
}

/// How a service collects its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// Single-line free text.
    Text,
    /// Multiline free text.
    Multiline,
    /// One choice out of a fixed option list.
    Select { options: &'static [&'static str] },
}

/// Static per-service descriptor. One per [`ServiceKind`], never mutated.
#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    pub kind: ServiceKind,
    pub title: &'static str,
    /// Icon identifier for the view layer (lucide name).
    pub icon: &'static str,
    pub placeholder: &'static str,
    pub input: InputShape,
    pub prompt_prefix: &'static str,
}

impl ServiceConfig {
    /// The fully assembled prompt sent to the backend: fixed prefix + raw input.
    pub fn full_prompt(&self, raw: &str) -> String {
        format!("{}{}", self.prompt_prefix, raw)
    }
}

pub const ZODIAC_SIGNS: &[&str] = &[
    "الحمل",
    "الثور",
    "الجوزاء",
    "السرطان",
    "الأسد",
    "العذراء",
    "الميزان",
    "العقرب",
    "القوس",
    "الجدي",
    "الدلو",
    "الحوت",
];

/// The Horoscope form pairs the chosen sign with a date before submitting.
pub fn sign_with_date(sign: &str, date: &str) -> String {
    format!("{sign} بتاريخ {date}")
}

impl ServiceKind {
    pub const ALL: &'static [ServiceKind] = &[
        ServiceKind::General,
        ServiceKind::Poem,
        ServiceKind::Story,
        ServiceKind::Horoscope,
        ServiceKind::PersonalityAnalysis,
        ServiceKind::Summary,
        ServiceKind::WritingImprover,
        ServiceKind::IdeaGenerator,
        ServiceKind::EmailWriter,
        ServiceKind::CvWriter,
        ServiceKind::SocialMediaPost,
        ServiceKind::RelationshipAnalysis,
        ServiceKind::Quiz,
        ServiceKind::NameGenerator,
        ServiceKind::QuoteOfTheDay,
        ServiceKind::DreamAnalysis,
        ServiceKind::VideoIdeaGenerator,
        ServiceKind::LyricGenerator,
        ServiceKind::QuoteGenerator,
        ServiceKind::DialogueGenerator,
        ServiceKind::ExamGenerator,
        ServiceKind::ConceptExplainer,
        ServiceKind::ProjectAnalysis,
        ServiceKind::TextAnalysis,
    ];

    pub fn all() -> impl Iterator<Item = ServiceKind> {
        Self::ALL.iter().copied()
    }

    pub fn config(self) -> &'static ServiceConfig {
        match self {
            ServiceKind::General => &ServiceConfig {
                kind: ServiceKind::General,
                title: "اكتب ما تفكر به",
                icon: "brain-circuit",
                placeholder: "اكتب فكرة ليتم توليد نص متكامل عنها (شرح، خطة، مقال، اقتراح...).",
                input: InputShape::Multiline,
                prompt_prefix: "اكتب مقالاً مفصلاً عن: ",
            },
            ServiceKind::Poem => &ServiceConfig {
                kind: ServiceKind::Poem,
                title: "توليد الشعر",
                icon: "feather",
                placeholder: "أدخل موضوع القصيدة...",
                input: InputShape::Text,
                prompt_prefix: "اكتب قصيدة بأسلوب أدبي بليغ عن: ",
            },
            ServiceKind::Story => &ServiceConfig {
                kind: ServiceKind::Story,
                title: "توليد القصص",
                icon: "book-open",
                placeholder: "أدخل فكرة أو عنوان القصة...",
                input: InputShape::Text,
                prompt_prefix: "اكتب قصة قصيرة ومشوّقة عن: ",
            },
            ServiceKind::Horoscope => &ServiceConfig {
                kind: ServiceKind::Horoscope,
                title: "الأبراج الترفيهي",
                icon: "sparkles",
                placeholder: "اختر برجك...",
                input: InputShape::Select {
                    options: ZODIAC_SIGNS,
                },
                prompt_prefix: "اكتب تحليلاً يومياً ترفيهياً ومضحكاً بأسلوب ظريف لبرج ",
            },
            ServiceKind::PersonalityAnalysis => &ServiceConfig {
                kind: ServiceKind::PersonalityAnalysis,
                title: "تحليل الشخصية",
                icon: "user-check",
                placeholder: "أدخل نصاً لوصف شخصية أو سلوك معين لتحليله...",
                input: InputShape::Multiline,
                prompt_prefix: "اكتب تحليل شخصية بناءً على النص التالي الذي يصف شخصًا ما: ",
            },
            ServiceKind::Summary => &ServiceConfig {
                kind: ServiceKind::Summary,
                title: "ملخص النصوص",
                icon: "text-quote",
                placeholder: "أدخل نصًا طويلًا ليتم تلخيصه باحتراف.",
                input: InputShape::Multiline,
                prompt_prefix: "لخص النص التالي بشكل احترافي وموجز: ",
            },
            ServiceKind::WritingImprover => &ServiceConfig {
                kind: ServiceKind::WritingImprover,
                title: "تحسين الكتابة",
                icon: "wand-2",
                placeholder: "لتحسين الأسلوب، تصحيح الأخطاء، أو إعادة الصياغة.",
                input: InputShape::Multiline,
                prompt_prefix: "قم بتحسين النص التالي من حيث الأسلوب والقواعد النحوية والإملائية وأعد صياغته ليكون أكثر بلاغة ووضوحًا: ",
            },
            ServiceKind::IdeaGenerator => &ServiceConfig {
                kind: ServiceKind::IdeaGenerator,
                title: "اقتراح أفكار",
                icon: "lightbulb",
                placeholder: "اقتراح أفكار مشاريع أو محتوى للمبدعين وأصحاب المشاريع.",
                input: InputShape::Text,
                prompt_prefix: "اقترح 5 أفكار مشاريع أو محتوى إبداعية ومبتكرة في مجال: ",
            },
            ServiceKind::EmailWriter => &ServiceConfig {
                kind: ServiceKind::EmailWriter,
                title: "كاتب البريد الإلكتروني الذكي",
                icon: "mail",
                placeholder: "يكتب أو يصيغ رسائل البريد بأسلوب احترافي.",
                input: InputShape::Multiline,
                prompt_prefix: "اكتب بريدًا إلكترونيًا احترافيًا بناءً على الوصف التالي: ",
            },
            ServiceKind::CvWriter => &ServiceConfig {
                kind: ServiceKind::CvWriter,
                title: "كاتب السيرة الذاتية / CV",
                icon: "file-text",
                placeholder: "يولد نصوص سيرة ذاتية جاهزة انطلاقًا من بيانات بسيطة.",
                input: InputShape::Multiline,
                prompt_prefix: "اكتب فقرة احترافية للسيرة الذاتية (Profile Summary) بناءً على المعلومات التالية: ",
            },
            ServiceKind::SocialMediaPost => &ServiceConfig {
                kind: ServiceKind::SocialMediaPost,
                title: "منشئ منشورات التواصل",
                icon: "share-2",
                placeholder: "لتوليد محتوى لمنصات مثل إنستغرام أو تويتر أو تيك توك.",
                input: InputShape::Multiline,
                prompt_prefix: "أنشئ منشورًا جذابًا لوسائل التواصل الاجتماعي بناءً على الفكرة التالية (مع إضافة هاشتاجات مناسبة): ",
            },
            ServiceKind::RelationshipAnalysis => &ServiceConfig {
                kind: ServiceKind::RelationshipAnalysis,
                title: "تحليل العلاقات (ترفيهي)",
                icon: "heart",
                placeholder: "تحليل ترفيهي بين اسمين أو برجين.",
                input: InputShape::Text,
                prompt_prefix: "اكتب تحليل توافق ترفيهي وظريف بين: ",
            },
            ServiceKind::Quiz => &ServiceConfig {
                kind: ServiceKind::Quiz,
                title: "اختبارات شخصية",
                icon: "puzzle",
                placeholder: "أسئلة تفاعلية تحلل الشخصية.",
                input: InputShape::Text,
                prompt_prefix: "أنشئ اختبارًا تفاعليًا قصيرًا (3-4 أسئلة) مع نتائج لتحليل الشخصية حول موضوع: ",
            },
            ServiceKind::NameGenerator => &ServiceConfig {
                kind: ServiceKind::NameGenerator,
                title: "مولد أسماء مميزة",
                icon: "tags",
                placeholder: "لأسماء أطفال، حسابات، قنوات يوتيوب، مشاريع...",
                input: InputShape::Text,
                prompt_prefix: "اقترح 10 أسماء مميزة وجذابة لـ: ",
            },
            ServiceKind::QuoteOfTheDay => &ServiceConfig {
                kind: ServiceKind::QuoteOfTheDay,
                title: "رسالة اليوم / حكمة",
                icon: "sunrise",
                placeholder: "اكتب \"حكمة اليوم\" أو اتركها فارغة وانقر \"توليد\".",
                input: InputShape::Text,
                prompt_prefix: "اكتب حكمة أو اقتباسًا تحفيزيًا قصيرًا وملهمًا عن ",
            },
            ServiceKind::DreamAnalysis => &ServiceConfig {
                kind: ServiceKind::DreamAnalysis,
                title: "تحليل الأحلام (ترفيهي)",
                icon: "cloudy",
                placeholder: "المستخدم يكتب حلمه، والنظام يعطي تفسيرًا بأسلوب ذكي وظريف.",
                input: InputShape::Multiline,
                prompt_prefix: "قدم تفسيرًا ترفيهيًا، ذكيًا، وظريفًا للحلم التالي: ",
            },
            ServiceKind::VideoIdeaGenerator => &ServiceConfig {
                kind: ServiceKind::VideoIdeaGenerator,
                title: "مولد أفكار فيديوهات",
                icon: "video",
                placeholder: "لتوليد نصوص لمقاطع فيديو قصيرة أو سكريبتات يوتيوب.",
                input: InputShape::Text,
                prompt_prefix: "اكتب 3 أفكار فيديوهات مع سكريبت موجز لكل فكرة حول الموضوع التالي: ",
            },
            ServiceKind::LyricGenerator => &ServiceConfig {
                kind: ServiceKind::LyricGenerator,
                title: "مولد كلمات أغاني",
                icon: "music",
                placeholder: "يكتب المستخدم موضوع الأغنية ليتم توليد كلمات مناسبة.",
                input: InputShape::Text,
                prompt_prefix: "اكتب كلمات أغنية بناءً على الموضوع والمزاج التالي: ",
            },
            ServiceKind::QuoteGenerator => &ServiceConfig {
                kind: ServiceKind::QuoteGenerator,
                title: "مولد اقتباسات",
                icon: "quote",
                placeholder: "مولد اقتباسات أدبية أو تحفيزية.",
                input: InputShape::Text,
                prompt_prefix: "اكتب 3 اقتباسات أدبية أو تحفيزية فريدة حول: ",
            },
            ServiceKind::DialogueGenerator => &ServiceConfig {
                kind: ServiceKind::DialogueGenerator,
                title: "توليد حوارات",
                icon: "message-square",
                placeholder: "قسم ممتع لمحبي القصص.",
                input: InputShape::Multiline,
                prompt_prefix: "اكتب حوارًا قصيرًا وممتعًا بين الشخصيات وفي الموقف التالي: ",
            },
            ServiceKind::ExamGenerator => &ServiceConfig {
                kind: ServiceKind::ExamGenerator,
                title: "مولد أسئلة امتحانات",
                icon: "file-question",
                placeholder: "توليد أسئلة امتحانات / اختبارات تعليمية.",
                input: InputShape::Text,
                prompt_prefix: "اكتب 5 أسئلة متنوعة (اختيار من متعدد، صواب/خطأ، سؤال مقالي) مع إجاباتها لمادة: ",
            },
            ServiceKind::ConceptExplainer => &ServiceConfig {
                kind: ServiceKind::ConceptExplainer,
                title: "شرح الدروس والمفاهيم",
                icon: "graduation-cap",
                placeholder: "يكتب المستخدم مفهوماً، والنظام يشرحه بأسلوب مبسط.",
                input: InputShape::Text,
                prompt_prefix: "اشرح المفهوم التالي بأسلوب مبسط وواضح ومناسب لغير المتخصصين: ",
            },
            ServiceKind::ProjectAnalysis => &ServiceConfig {
                kind: ServiceKind::ProjectAnalysis,
                title: "تحليل أفكار المشاريع",
                icon: "bar-chart-2",
                placeholder: "تحليل أفكار المشاريع / دراسات جدوى مبسطة.",
                input: InputShape::Multiline,
                prompt_prefix: "قم بتحليل فكرة المشروع التالية وقدم دراسة جدوى مبسطة تشمل نقاط القوة، نقاط الضعف، الفرص، والتهديدات (SWOT Analysis): ",
            },
            ServiceKind::TextAnalysis => &ServiceConfig {
                kind: ServiceKind::TextAnalysis,
                title: "تحليل النصوص والمقالات",
                icon: "scan-text",
                placeholder: "تحليل النصوص أو المقالات (نغمة، أسلوب، هدف).",
                input: InputShape::Multiline,
                prompt_prefix: "حلل النص التالي من حيث النغمة (Tone)، الأسلوب (Style)، والهدف الأساسي للكاتب (Author's purpose): ",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_kind_exactly_once() {
        assert_eq!(ServiceKind::ALL.len(), 24);
        for kind in ServiceKind::all() {
            assert_eq!(kind.config().kind, kind);
        }
    }

    #[test]
    fn kind_serializes_with_legacy_wire_names() {
        let v = serde_json::to_value(ServiceKind::PersonalityAnalysis).expect("serialize");
        assert_eq!(v, "PERSONALITY_ANALYSIS");
        let back: ServiceKind = serde_json::from_str("\"CV_WRITER\"").expect("deserialize");
        assert_eq!(back, ServiceKind::CvWriter);
    }

    #[test]
    fn horoscope_is_a_select_over_the_zodiac() {
        match ServiceKind::Horoscope.config().input {
            InputShape::Select { options } => assert_eq!(options, ZODIAC_SIGNS),
            other => panic!("expected select, got {other:?}"),
        }
    }

    #[test]
    fn horoscope_prompt_assembly_matches_the_form() {
        let raw = sign_with_date("الحمل", "2024-01-01");
        let full = ServiceKind::Horoscope.config().full_prompt(&raw);
        assert_eq!(
            full,
            "اكتب تحليلاً يومياً ترفيهياً ومضحكاً بأسلوب ظريف لبرج الحمل بتاريخ 2024-01-01"
        );
    }
}

use crate::models::quiz::{Question, QuestionOption, OPTION_IDS};
use crate::models::Language;
use crate::services::generator_service::{RawOption, RawQuestion};

/// Shapes untrusted generator output into the Question contract: exactly
/// four options, a correct answer that names one of them, ids 1..N by
/// position. Degrades with placeholders instead of failing.
pub fn normalize_questions(raw: Vec<RawQuestion>, count: u8, language: Language) -> Vec<Question> {
    raw.into_iter()
        .take(count as usize)
        .enumerate()
        .map(|(index, question)| normalize_question(question, index as u32 + 1, language))
        .collect()
}

fn normalize_question(raw: RawQuestion, id: u32, language: Language) -> Question {
    let mut used_ids: Vec<String> = Vec::with_capacity(4);
    let mut options: Vec<QuestionOption> = Vec::with_capacity(4);

    for raw_option in raw.options.into_iter().take(OPTION_IDS.len()) {
        let (option_id, text) = match raw_option {
            RawOption::Labeled { id, text } => (id, text),
            RawOption::Bare(text) => (None, Some(text)),
            RawOption::Other(_) => (None, None),
        };

        let option_id = option_id
            .map(|value| value.trim().to_uppercase())
            .filter(|value| OPTION_IDS.contains(&value.as_str()) && !used_ids.contains(value))
            .unwrap_or_else(|| next_unused_id(&used_ids));

        used_ids.push(option_id.clone());
        options.push(QuestionOption {
            id: option_id,
            text: text
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| placeholder_option(language).to_string()),
        });
    }

    while options.len() < OPTION_IDS.len() {
        let option_id = next_unused_id(&used_ids);
        used_ids.push(option_id.clone());
        options.push(QuestionOption {
            id: option_id,
            text: placeholder_option(language).to_string(),
        });
    }

    let correct_answer = raw
        .correct_answer
        .map(|value| value.trim().to_uppercase())
        .filter(|value| options.iter().any(|option| &option.id == value))
        .unwrap_or_else(|| options[0].id.clone());

    Question {
        id,
        question: raw
            .question
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| placeholder_question(language).to_string()),
        options,
        correct_answer,
        explanation: raw
            .explanation
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| placeholder_explanation(language).to_string()),
    }
}

fn next_unused_id(used: &[String]) -> String {
    OPTION_IDS
        .iter()
        .find(|candidate| !used.iter().any(|used_id| used_id == *candidate))
        .unwrap_or(&"D")
        .to_string()
}

fn placeholder_question(language: Language) -> &'static str {
    match language {
        Language::Id => "Pertanyaan tidak tersedia",
        Language::En => "Question unavailable",
    }
}

fn placeholder_option(language: Language) -> &'static str {
    match language {
        Language::Id => "Pilihan tidak tersedia",
        Language::En => "Option unavailable",
    }
}

fn placeholder_explanation(language: Language) -> &'static str {
    match language {
        Language::Id => "Penjelasan tidak tersedia",
        Language::En => "Explanation unavailable",
    }
}

/// Fixed question set served when live generation fails. Generic study-check
/// questions so the learner is never blocked on a generator outage.
pub fn fallback_questions(count: u8, language: Language) -> Vec<Question> {
    // The fallback path can be reached before request validation, so the
    // count is clamped to the valid range here as well.
    let count = count.clamp(1, 10);
    let base = match language {
        Language::Id => FALLBACK_ID,
        Language::En => FALLBACK_EN,
    };

    (0..count as usize)
        .map(|index| {
            let (question, options, correct, explanation) = base[index % base.len()];
            Question {
                id: index as u32 + 1,
                question: question.to_string(),
                options: OPTION_IDS
                    .iter()
                    .zip(options.iter())
                    .map(|(id, text)| QuestionOption {
                        id: id.to_string(),
                        text: text.to_string(),
                    })
                    .collect(),
                correct_answer: correct.to_string(),
                explanation: explanation.to_string(),
            }
        })
        .collect()
}

type FallbackEntry = (&'static str, [&'static str; 4], &'static str, &'static str);

const FALLBACK_EN: &[FallbackEntry] = &[
    (
        "What is the main idea of the material you just read?",
        [
            "The core concept the tutorial explains",
            "A topic the tutorial never mentions",
            "Only the closing paragraph",
            "The site navigation",
        ],
        "A",
        "A quick self-check: every tutorial is organized around one core concept.",
    ),
    (
        "What is the most effective next step after reading the material?",
        [
            "Skip to an unrelated tutorial",
            "Try applying the concept in a small exercise",
            "Memorize the text word by word",
            "Close the page immediately",
        ],
        "B",
        "Applying a concept right after reading is the fastest way to retain it.",
    ),
    (
        "Which part of the material deserves a second read?",
        [
            "The parts you already know well",
            "The advertisements",
            "The sections that still feel unclear",
            "None, one read is always enough",
        ],
        "C",
        "Revisiting the unclear sections closes the gaps a single read leaves behind.",
    ),
    (
        "Why are the examples in the material worth studying?",
        [
            "They are optional decoration",
            "They show the concept applied in practice",
            "They replace the need to read the text",
            "They are only for advanced readers",
        ],
        "B",
        "Worked examples connect the abstract explanation to concrete use.",
    ),
    (
        "When is a good moment to retake this quiz?",
        [
            "After reviewing the material again",
            "Immediately, without re-reading",
            "Never",
            "Only after a week has passed",
        ],
        "A",
        "Retaking the quiz after review measures what the review actually fixed.",
    ),
];

const FALLBACK_ID: &[FallbackEntry] = &[
    (
        "Apa ide utama dari materi yang baru saja Anda baca?",
        [
            "Konsep inti yang dijelaskan tutorial",
            "Topik yang tidak pernah dibahas",
            "Hanya paragraf penutup",
            "Navigasi situs",
        ],
        "A",
        "Pemeriksaan cepat: setiap tutorial disusun di sekitar satu konsep inti.",
    ),
    (
        "Apa langkah paling efektif setelah membaca materi?",
        [
            "Lompat ke tutorial yang tidak berhubungan",
            "Mencoba menerapkan konsep dalam latihan kecil",
            "Menghafal teks kata demi kata",
            "Segera menutup halaman",
        ],
        "B",
        "Menerapkan konsep segera setelah membaca adalah cara tercepat untuk mengingatnya.",
    ),
    (
        "Bagian mana dari materi yang layak dibaca ulang?",
        [
            "Bagian yang sudah Anda kuasai",
            "Iklan",
            "Bagian yang masih terasa belum jelas",
            "Tidak ada, sekali baca selalu cukup",
        ],
        "C",
        "Membaca ulang bagian yang belum jelas menutup celah pemahaman.",
    ),
    (
        "Mengapa contoh dalam materi penting untuk dipelajari?",
        [
            "Contoh hanyalah hiasan",
            "Contoh menunjukkan penerapan konsep secara nyata",
            "Contoh menggantikan kebutuhan membaca teks",
            "Contoh hanya untuk pembaca tingkat lanjut",
        ],
        "B",
        "Contoh menghubungkan penjelasan abstrak dengan penggunaan nyata.",
    ),
    (
        "Kapan waktu yang tepat untuk mengulang kuis ini?",
        [
            "Setelah mempelajari kembali materinya",
            "Segera, tanpa membaca ulang",
            "Tidak pernah",
            "Hanya setelah satu minggu berlalu",
        ],
        "A",
        "Mengulang kuis setelah belajar kembali mengukur kemajuan yang sebenarnya.",
    ),
];

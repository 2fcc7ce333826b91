use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use icu_normalizer::ComposingNormalizerBorrowed;
use log::{info, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::event::AppEvent;
use crate::generator::PassageSource;
use crate::lookup::{Completion, CompletionRequest, LookupError};

const TOPIC_CATEGORIES: &[&str] = &[
    "Ancient Civilizations",
    "Renaissance Art",
    "Quantum Physics",
    "Marine Biology",
    "Classical Literature",
    "Modern Architecture",
    "Space Exploration",
    "Environmental Science",
    "Medieval History",
    "Digital Technology",
    "Human Psychology",
    "Economic Theory",
    "Philosophical Concepts",
    "Medical Advances",
    "Cultural Anthropology",
    "Astronomy",
    "Political Science",
    "Chemical Engineering",
    "Linguistics",
    "Climate Science",
];

const RANDOM_TOPIC_DOMAINS: &[&str] = &[
    "history",
    "science",
    "literature",
    "art",
    "technology",
    "philosophy",
    "economics",
    "psychology",
];

/// Shown when generation fails or is not configured.
pub const FALLBACK_PASSAGES: &[&str] = &[
    "The concept of artificial intelligence has evolved dramatically over the past few decades. Initially conceived as a way to replicate human reasoning, AI has transformed into a multifaceted field encompassing machine learning, natural language processing, and computer vision. The implications of these advancements extend far beyond academic curiosity, potentially revolutionizing industries from healthcare to transportation.

Contemporary AI systems demonstrate remarkable capabilities in pattern recognition and data analysis. However, they also present unprecedented challenges regarding ethics, employment, and societal impact. As we navigate this technological landscape, it becomes increasingly important to establish frameworks for responsible AI development and deployment.

The proliferation of AI technologies raises fundamental questions about the nature of intelligence itself. While machines can process vast amounts of information and identify complex patterns, the question of whether they truly \"understand\" remains contentious among researchers and philosophers alike.",
    "The Renaissance period marked a profound transformation in European art and culture, spanning roughly from the 14th to the 17th century. This era witnessed the emergence of groundbreaking artistic techniques, including linear perspective and chiaroscuro, which revolutionized how artists represented three-dimensional space and light on two-dimensional surfaces.

The cultural movement was characterized by a renewed interest in classical antiquity, leading to the rediscovery of ancient Greek and Roman texts and artistic principles. Artists like Leonardo da Vinci and Michelangelo exemplified the Renaissance ideal of the \"universal man,\" combining artistic talent with scientific inquiry and philosophical depth. This period also saw the development of humanism, which emphasized the value and agency of human beings, individually and collectively.",
    "Quantum mechanics represents one of the most revolutionary developments in modern physics, fundamentally altering our understanding of the universe at its most fundamental level. The theory introduces concepts that challenge our everyday intuition, such as wave-particle duality, where particles can exhibit both wave-like and particle-like properties depending on how they are observed.

The uncertainty principle, formulated by Werner Heisenberg, states that it is impossible to simultaneously know both the position and momentum of a particle with absolute precision. This principle has profound implications for our understanding of reality, suggesting that at the quantum level, the universe operates according to probabilistic rather than deterministic laws. These discoveries have led to technological innovations ranging from lasers and transistors to quantum computers and medical imaging devices.",
    "Marine biology encompasses the scientific study of organisms that inhabit the world's oceans and other saltwater environments. This diverse field investigates everything from microscopic plankton to the largest creatures on Earth, including blue whales that can reach lengths of over 100 feet. Marine biologists study not only individual species but also complex ecosystems and the intricate relationships between marine organisms and their environment.

The field has become increasingly important as human activities impact ocean health through pollution, overfishing, and climate change. Coral reefs, often called the \"rainforests of the sea,\" serve as crucial habitats for thousands of species while also protecting coastal communities from storms and erosion. Understanding marine ecosystems is essential for developing sustainable practices that preserve these vital resources for future generations.",
    "The Industrial Revolution, beginning in the late 18th century, fundamentally transformed human society through unprecedented technological and economic changes. This period saw the transition from manual labor and hand production methods to machine-based manufacturing, dramatically increasing productivity and efficiency across various industries.

The development of steam power, mechanized textile production, and improved iron-making techniques created new economic opportunities while also presenting significant social challenges. Urbanization accelerated as people moved from rural areas to cities in search of employment, leading to the growth of industrial centers and the emergence of new social classes. This transformation also sparked important discussions about labor rights, working conditions, and the role of government in regulating industrial development.",
    "Cognitive psychology explores the mental processes that underlie human behavior, including attention, memory, language, problem-solving, and decision-making. This field investigates how people acquire, process, store, and retrieve information, providing insights into both normal cognitive functioning and various cognitive disorders.

Research in cognitive psychology has revealed that human memory is not a passive storage system but an active, reconstructive process influenced by various factors such as attention, emotion, and context. Studies have shown that our cognitive processes are subject to various biases and limitations, which can affect everything from eyewitness testimony to medical diagnosis. Understanding these cognitive mechanisms has important applications in education, healthcare, and artificial intelligence development.",
    "Climate change represents one of the most pressing global challenges of the 21st century, with far-reaching implications for ecosystems, human societies, and economic systems worldwide. The scientific consensus indicates that human activities, particularly the burning of fossil fuels and deforestation, have significantly contributed to the observed warming of Earth's climate system.

The impacts of climate change are already evident in rising global temperatures, melting polar ice caps, and increasingly frequent extreme weather events. These changes affect agricultural productivity, water availability, and human health, while also threatening biodiversity and ecosystem stability. Addressing climate change requires coordinated international efforts to reduce greenhouse gas emissions, develop renewable energy sources, and implement adaptation strategies to cope with unavoidable changes.",
];

const MIN_PASSAGE_CHARS: usize = 100;
const TITLE_MAX_CHARS: usize = 150;

/// Result of a background generation request.
#[derive(Clone, Debug)]
pub struct PassageReady {
    pub result: Result<String, String>,
}

/// Picks a topic; about a third of the time an open-ended one from a broad domain.
pub fn pick_topic<R: Rng>(rng: &mut R) -> String {
    if rng.gen_bool(0.3) {
        let domain = RANDOM_TOPIC_DOMAINS
            .choose(rng)
            .copied()
            .unwrap_or("science");
        format!("a random academic topic from {domain}")
    } else {
        TOPIC_CATEGORIES
            .choose(rng)
            .copied()
            .unwrap_or("Astronomy")
            .to_string()
    }
}

pub fn passage_prompt(topic: &str) -> CompletionRequest {
    CompletionRequest {
        system: None,
        prompt: format!(
            "Generate a 150-200 word SSAT upper-level reading passage about {topic}.

Requirements:
- Exactly 2-3 paragraphs
- Mix of standard and advanced vocabulary
- Formal, educational tone
- No titles or introductions
- Start directly with the first word of the passage
- Make it completely different from any previous passages

Topic: {topic}"
        ),
        max_tokens: 300,
        temperature: 0.9,
    }
}

pub fn normalize_text(text: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(text)
        .into_owned()
}

/// Tidy a generated passage. Replies that are too short are rejected; a short
/// first paragraph without a period is taken to be a title and dropped.
pub fn clean_generated(raw: &str) -> Option<String> {
    let text = normalize_text(raw.trim());
    if text.chars().count() < MIN_PASSAGE_CHARS {
        return None;
    }
    let paragraphs: Vec<&str> = text.split("\n\n").collect();
    if paragraphs.len() > 1
        && paragraphs[0].chars().count() < TITLE_MAX_CHARS
        && !paragraphs[0].contains('.')
    {
        return Some(paragraphs[1..].join("\n\n").trim().to_string());
    }
    Some(text)
}

/// A fallback passage, avoiding `avoid` when another one is available.
pub fn pick_fallback<R: Rng>(rng: &mut R, avoid: Option<&str>) -> &'static str {
    let candidates: Vec<&'static str> = FALLBACK_PASSAGES
        .iter()
        .copied()
        .filter(|p| Some(*p) != avoid)
        .collect();
    candidates
        .choose(rng)
        .copied()
        .unwrap_or(FALLBACK_PASSAGES[0])
}

/// Generates passages with the LLM collaborator.
pub struct LlmPassageGenerator {
    completion: Box<dyn Completion>,
}

impl LlmPassageGenerator {
    pub fn new(completion: Box<dyn Completion>) -> Self {
        Self { completion }
    }
}

impl PassageSource for LlmPassageGenerator {
    fn generate(&self) -> Result<String, LookupError> {
        let topic = pick_topic(&mut rand::thread_rng());
        info!("generating passage about {topic}");
        let reply = self.completion.complete(&passage_prompt(&topic))?;
        clean_generated(&reply)
            .ok_or_else(|| LookupError::Malformed("generated passage too short".to_string()))
    }
}

/// Runs `source` on a background thread and posts the outcome as an event.
pub fn spawn_generation(source: Arc<dyn PassageSource>, tx: Sender<AppEvent>) {
    thread::spawn(move || {
        let result = source.generate().map_err(|err| {
            warn!("passage generation failed: {err}");
            err.to_string()
        });
        let _ = tx.send(AppEvent::Passage(PassageReady { result }));
    });
}

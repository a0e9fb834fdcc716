//! Genre preset catalog.
//!
//! A fixed mapping from genre name to a canned descriptive prompt (a
//! comma-separated tag string covering instrumentation, tempo, and mood).
//! The catalog is static and shared read-only by all requests; an unknown
//! name is reported to the caller, never silently defaulted.

/// All known presets, in display order.
static PRESETS: [(&str, &str); 10] = [
    (
        "Modern Pop",
        "pop, synth, drums, guitar, 120 bpm, upbeat, catchy, vibrant",
    ),
    (
        "Rock",
        "rock, electric guitar, drums, bass, 130 bpm, energetic, rebellious, gritty",
    ),
    (
        "Hip Hop",
        "hip hop, 808 bass, hi-hats, synth, 90 bpm, bold, urban, intense",
    ),
    (
        "Country",
        "country, acoustic guitar, steel guitar, fiddle, 100 bpm, heartfelt, rustic, warm",
    ),
    (
        "EDM",
        "edm, synth, bass, kick drum, 128 bpm, euphoric, pulsating, energetic",
    ),
    (
        "Reggae",
        "reggae, guitar, bass, drums, 80 bpm, chill, soulful, positive",
    ),
    (
        "Classical",
        "classical, orchestral, strings, piano, 60 bpm, elegant, emotional, timeless",
    ),
    (
        "Jazz",
        "jazz, saxophone, piano, double bass, 90 bpm, smooth, improvisational, soulful",
    ),
    (
        "Metal",
        "metal, distorted guitar, double kick drum, bass, 160 bpm, aggressive, intense, heavy",
    ),
    (
        "R&B",
        "r&b, synth, bass, drums, 85 bpm, sensual, groovy, romantic",
    ),
];

/// Look up the descriptive prompt for a genre preset. Exact match only.
pub fn lookup(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, prompt)| *prompt)
}

/// Names of all known presets, in display order.
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(key, _)| *key)
}

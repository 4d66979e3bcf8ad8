use normalize::TextNormalizer;

fn main() {
    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "!!Connect me with Paul's meeting room please.".to_string());

    let normalizer = TextNormalizer::default();
    let processed = normalizer.process(&input);
    let normalized = normalizer.normalize(&processed.text);
    let map = processed.map.compose(&normalized.map);

    println!("raw:        {input}");
    println!("processed:  {}", processed.text);
    println!("normalized: {}", normalized.text);
    for (idx, ch) in normalized.text.chars().enumerate() {
        if let Ok(raw) = map.backward(idx) {
            println!("  {idx:>3} {ch:?} <- raw {raw}");
        }
    }
}

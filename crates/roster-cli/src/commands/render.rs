use roster_core::Registry;

pub fn run(words: Vec<String>) {
    let mut registry: Registry = Registry::new();
    for word in &words {
        registry.add(word);
    }
    println!("{}", registry.render());
}

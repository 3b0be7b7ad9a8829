use shadow_rs::ShadowBuilder;

fn main() {
    // Build metadata backs `--version` output
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}

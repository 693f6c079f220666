use trigon_lessons::Lesson;

fn main() -> anyhow::Result<()> {
    trigon_lessons::run(Lesson::Shaders)
}

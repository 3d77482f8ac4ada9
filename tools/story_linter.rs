/// Story Linter — validates chapter graphs before they are played.
///
/// Usage: story_linter <chapter_dir | chapter.ron>...

use adventure_engine::core::library::ChapterLibrary;
use adventure_engine::core::lint::lint_library;
use adventure_engine::schema::chapter::Chapter;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        println!("Usage: story_linter <chapter_dir | chapter.ron>...");
        process::exit(0);
    }

    // Chapters chain across files, so everything is linted as one library.
    let mut library = ChapterLibrary::new();
    for arg in &args {
        let path = Path::new(arg);
        if path.is_dir() {
            match ChapterLibrary::load_dir(path) {
                Ok(loaded) => {
                    for chapter in loaded.chapters() {
                        println!("  Loaded: {}", chapter.name());
                        library.insert(chapter.clone());
                    }
                }
                Err(e) => {
                    eprintln!("ERROR: Failed to load {}: {}", path.display(), e);
                    process::exit(1);
                }
            }
        } else if path.is_file() {
            match Chapter::load_from_ron(path) {
                Ok(chapter) => {
                    println!("  Loaded: {}", chapter.name());
                    library.insert(chapter);
                }
                Err(e) => {
                    eprintln!("ERROR: Failed to load {}: {}", path.display(), e);
                    process::exit(1);
                }
            }
        } else {
            eprintln!("ERROR: Path '{}' does not exist", arg);
            process::exit(1);
        }
    }

    println!("Loaded {} chapters", library.len());

    let report = lint_library(&library);

    println!("\n=== Story Lint Report ===\n");
    if report.is_clean() {
        println!("All checks passed!");
    }
    println!("{report}");

    if report.has_errors() {
        process::exit(1);
    }
}

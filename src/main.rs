use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;

use git_changelog::config::{self, Config};
use git_changelog::format::format_stanza;
use git_changelog::git::{Git2History, History};
use git_changelog::metadata::PackageMetadata;
use git_changelog::release::resolve_release;
use git_changelog::segment::Segments;
use git_changelog::tags::TagIndex;
use git_changelog::ui;
use git_changelog::version::{slugify, VersionResolver};

#[derive(clap::Parser)]
#[command(
    name = "git-changelog",
    about = "Build a debian/changelog file from a git history tree"
)]
struct Args {
    #[arg(long, help = "The commit to search from. Defaults to the current HEAD")]
    commit: Option<String>,

    #[arg(
        long,
        default_value = ".",
        help = "The git repository to search on. Defaults to the current directory"
    )]
    git_repository: String,

    #[arg(long, help = "The eventual tag that specifies the base version of the package")]
    tag: Option<String>,

    #[arg(
        long = "tag-prefix",
        help = "The prefix of the tag supplied with --tag. May be repeated"
    )]
    tag_prefix: Vec<String>,

    #[arg(long, help = "The branch where the commit is on. Defaults to the current branch")]
    branch: Option<String>,

    #[arg(long, help = "The prefix used to define feature branches")]
    branch_prefix: Option<String>,

    #[arg(long, help = "The branch used for rolling releases")]
    rolling_release: Option<String>,

    #[arg(long, help = "The actual release to be used on rolling releases")]
    rolling_release_replacement: Option<String>,

    #[arg(long, help = "A slugified comment that is set as version suffix")]
    comment: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Path of the changelog to write")]
    output: Option<String>,

    #[arg(long, help = "Print the changelog to standard output instead of writing the file")]
    stdout: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration.
    fn merge_into(&self, config: &mut Config) {
        if !self.tag_prefix.is_empty() {
            config.tag_prefixes = self.tag_prefix.clone();
        }
        if let Some(branch_prefix) = &self.branch_prefix {
            config.branch_prefix = branch_prefix.clone();
        }
        if let Some(rolling_release) = &self.rolling_release {
            config.rolling_release = Some(rolling_release.clone());
        }
        if let Some(replacement) = &self.rolling_release_replacement {
            config.rolling_release_replacement = Some(replacement.clone());
        }
        if let Some(comment) = &self.comment {
            config.comment = comment.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };
    args.merge_into(&mut config);

    let history = Git2History::open(&args.git_repository).with_context(|| {
        format!(
            "unable to load git repository at {}. You can use --git-repository to change the repo path",
            args.git_repository
        )
    })?;
    let workdir = history
        .workdir()
        .context("the repository has no working directory")?
        .to_path_buf();

    let metadata = PackageMetadata::load(&workdir, &config.version_hint_file, &config.output)?;

    let target = match &args.commit {
        Some(rev) => history.resolve(rev)?,
        None => history.head()?,
    };

    // An explicit tag disables the branch fallback: production builds
    // carry their release in the tag
    let branch = match (&args.branch, &args.tag) {
        (Some(branch), _) => Some(branch.clone()),
        (None, Some(_)) => None,
        (None, None) => history.current_branch()?,
    };

    let comment = slugify(&config.comment.replace(config.branch_prefix.as_str(), ""));

    let tag_index = TagIndex::build(&history, &config.tag_prefixes)?;

    let mut resolver = VersionResolver::new(
        &history,
        &tag_index,
        &config.tag_prefixes,
        target.clone(),
        args.tag.clone(),
        &metadata,
        &comment,
    );

    // Resolve the version before the output file is replaced, so the
    // legacy-changelog strategy still sees the pre-existing file
    let version = resolver.resolve()?;
    let release = resolve_release(args.tag.as_deref(), branch.as_deref(), &config)?;

    ui::display_status(&format!("Resulting version is {}", version));

    let segments = Segments::new(
        &history,
        &tag_index,
        &config.tag_prefixes,
        &target,
        release,
        version,
    )?;

    if args.stdout {
        let stdout = io::stdout();
        write_changelog(segments, &metadata.name, &config.urgency, stdout.lock())?;
    } else {
        let path = workdir.join(&config.output);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let writer = BufWriter::new(File::create(&path)?);
        write_changelog(segments, &metadata.name, &config.urgency, writer)?;

        ui::display_success(&format!("Wrote {}", path.display()));
    }

    Ok(())
}

/// Stream segments into the writer, one stanza at a time.
fn write_changelog<W: Write>(
    segments: Segments<'_>,
    name: &str,
    urgency: &str,
    mut writer: W,
) -> Result<()> {
    for segment in segments {
        let (release, version, entry) = segment?;
        writer.write_all(format_stanza(name, &version, &release, urgency, &entry).as_bytes())?;
    }
    writer.flush()?;

    Ok(())
}

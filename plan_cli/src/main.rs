use chrono::{Duration, NaiveDate};
use clap::{Args, Parser, Subcommand};
use plan_core::sequencing::{insert_day, insert_moveframe, insert_workout, remove_workout, resequence_day};
use plan_core::store::{read_json, write_json_atomic};
use plan_core::*;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "moveplan")]
#[command(about = "Workout plan editor and statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty plan
    Init {
        #[arg(long, default_value = "Training plan")]
        name: String,

        /// First day of a dated plan (YYYY-MM-DD, defaults to today)
        #[arg(long, conflicts_with = "template")]
        start: Option<NaiveDate>,

        #[arg(long, default_value_t = 1)]
        weeks: u32,

        /// Undated template plan
        #[arg(long)]
        template: bool,

        /// Replace an existing plan
        #[arg(long)]
        force: bool,
    },

    /// Add a workout to a day
    AddWorkout {
        /// Day date (YYYY-MM-DD) or id
        #[arg(long)]
        day: DayRef,

        /// Position among the day's workouts (0-based, default last)
        #[arg(long)]
        at: Option<usize>,

        #[arg(long)]
        name: Option<String>,
    },

    /// Remove a workout and renumber its day
    RemoveWorkout {
        #[arg(long)]
        id: Uuid,
    },

    /// Append a moveframe to a workout
    AddMoveframe {
        #[arg(long)]
        workout: Uuid,

        #[arg(long)]
        sport: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Distance lap as METERS:SECONDS (repeatable)
        #[arg(long = "lap")]
        laps: Vec<String>,

        /// Repetition lap (repeatable)
        #[arg(long = "set")]
        sets: Vec<u32>,

        /// Manual-mode total (meters for aerobic sports, reps otherwise)
        #[arg(long, conflicts_with_all = ["laps", "sets"])]
        manual: Option<f64>,

        /// Aerobic repeat multiplier
        #[arg(long)]
        series: Option<u32>,
    },

    /// Copy a day, workout or moveframe to the clipboard
    Copy(EntityArg),

    /// Cut a day, workout or moveframe to the clipboard
    Cut(EntityArg),

    /// Paste the clipboard into a week, day or workout
    Paste(PasteArg),

    /// Check plan invariants
    Validate {
        /// Renumber everything and save
        #[arg(long)]
        repair: bool,
    },

    /// Show derived workout statuses
    Status {
        /// Reference date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Show per-sport totals
    Stats {
        #[arg(long, conflicts_with_all = ["workout", "week"])]
        day: Option<DayRef>,

        #[arg(long, conflicts_with = "week")]
        workout: Option<Uuid>,

        /// Week number
        #[arg(long)]
        week: Option<u32>,

        /// Also export the totals to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show plan density color
    Density,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct EntityArg {
    /// Day date (YYYY-MM-DD) or id
    #[arg(long)]
    day: Option<DayRef>,

    #[arg(long)]
    workout: Option<Uuid>,

    #[arg(long)]
    moveframe: Option<Uuid>,
}

#[derive(Args)]
struct PasteArg {
    /// Week number hosting a pasted day
    #[arg(long, group = "target")]
    into_week: Option<u32>,

    /// Day hosting a pasted workout
    #[arg(long, group = "target")]
    into_day: Option<DayRef>,

    /// Workout hosting a pasted moveframe
    #[arg(long, group = "target")]
    into_workout: Option<Uuid>,

    /// New date for a pasted day
    #[arg(long, requires = "into_week")]
    date: Option<NaiveDate>,

    /// Position among the target's children (0-based)
    #[arg(long)]
    at: Option<usize>,
}

/// A day addressed by date or id
#[derive(Clone, Copy, Debug)]
enum DayRef {
    Date(NaiveDate),
    Id(Uuid),
}

impl FromStr for DayRef {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(DayRef::Date(date));
        }
        Uuid::parse_str(s)
            .map(DayRef::Id)
            .map_err(|_| format!("'{}' is neither a date (YYYY-MM-DD) nor a day id", s))
    }
}

impl DayRef {
    fn resolve(&self, plan: &Plan) -> Result<Uuid> {
        match self {
            DayRef::Date(date) => plan
                .day_on(*date)
                .map(|d| d.id)
                .ok_or_else(|| Error::Other(format!("No day on {} in this plan", date))),
            DayRef::Id(id) => plan.day(*id).map(|d| d.id).ok_or(Error::NotFound {
                kind: EntityKind::Day,
                id: *id,
            }),
        }
    }
}

struct Workspace {
    store: JsonFileStore,
    clipboard_path: PathBuf,
}

impl Workspace {
    fn open(data_dir: &Path) -> Self {
        Self {
            store: JsonFileStore::new(data_dir.join("plan.json")),
            clipboard_path: data_dir.join("clipboard.json"),
        }
    }

    fn load_plan(&self) -> Result<Plan> {
        if !self.store.exists() {
            return Err(Error::Other(format!(
                "No plan at {} - run `moveplan init` first",
                self.store.path().display()
            )));
        }
        self.store.load()
    }

    fn load_clipboard(&self) -> Result<Clipboard> {
        if !self.clipboard_path.exists() {
            return Ok(Clipboard::Idle);
        }
        read_json(&self.clipboard_path)
    }

    fn save_clipboard(&self, clipboard: &Clipboard) -> Result<()> {
        write_json_atomic(&self.clipboard_path, clipboard)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    plan_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data dir {:?}", data_dir);
    let mut ws = Workspace::open(&data_dir);
    let taxonomy = get_default_taxonomy().with_overrides(&config.sports);

    match cli.command {
        Commands::Init {
            name,
            start,
            weeks,
            template,
            force,
        } => cmd_init(&mut ws, name, start, weeks, template, force),
        Commands::AddWorkout { day, at, name } => cmd_add_workout(&mut ws, day, at, name),
        Commands::RemoveWorkout { id } => cmd_remove_workout(&mut ws, id),
        Commands::AddMoveframe {
            workout,
            sport,
            description,
            laps,
            sets,
            manual,
            series,
        } => {
            let sport = Sport::parse(&sport);
            let mut mf = Moveframe::new(sport.clone());
            mf.description = description;
            mf.aerobic_series = series;
            if let Some(total) = manual {
                mf.manual_mode = true;
                if taxonomy.is_aerobic(&sport) {
                    mf.distance = total.into();
                } else {
                    mf.repetitions = total.into();
                }
            }
            for lap in &laps {
                mf.movelaps.push(parse_lap(lap)?);
            }
            mf.movelaps.extend(sets.into_iter().map(Movelap::reps));
            cmd_add_moveframe(&mut ws, workout, mf)
        }
        Commands::Copy(entity) => cmd_hold(&ws, entity, TransferMode::Copy),
        Commands::Cut(entity) => cmd_hold(&ws, entity, TransferMode::Cut),
        Commands::Paste(arg) => cmd_paste(&mut ws, arg),
        Commands::Validate { repair } => cmd_validate(&mut ws, repair),
        Commands::Status { today } => {
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            cmd_status(&ws, config.status.rules(), today)
        }
        Commands::Stats {
            day,
            workout,
            week,
            csv,
        } => cmd_stats(&ws, &taxonomy, day, workout, week, csv),
        Commands::Density => cmd_density(&ws),
    }
}

fn cmd_init(
    ws: &mut Workspace,
    name: String,
    start: Option<NaiveDate>,
    weeks: u32,
    template: bool,
    force: bool,
) -> Result<()> {
    if ws.store.exists() && !force {
        return Err(Error::Other(format!(
            "A plan already exists at {} (use --force to replace it)",
            ws.store.path().display()
        )));
    }

    let mode = if template {
        PlanMode::Template
    } else {
        PlanMode::Dated
    };
    let mut plan = Plan::new(name, mode);
    let start = start.unwrap_or_else(|| chrono::Local::now().date_naive());

    for number in 1..=weeks {
        let mut week = Week::new(number);
        for offset in 0..7u8 {
            let day = match mode {
                PlanMode::Dated => {
                    let days = i64::from(number - 1) * 7 + i64::from(offset);
                    Day::on(start + Duration::days(days))
                }
                PlanMode::Template => Day {
                    slot: Some(offset + 1),
                    ..Day::new(None)
                },
            };
            week = insert_day(&week, day)?;
        }
        plan.weeks.push(week);
    }

    ws.store.save(&plan)?;
    ws.save_clipboard(&Clipboard::Idle)?;
    println!("✓ Created plan '{}' with {} weeks", plan.name, weeks);
    println!("  Plan: {}", ws.store.path().display());
    Ok(())
}

fn cmd_add_workout(ws: &mut Workspace, day: DayRef, at: Option<usize>, name: Option<String>) -> Result<()> {
    let mut plan = ws.load_plan()?;
    let day_id = day.resolve(&plan)?;

    let workout = Workout {
        name,
        ..Workout::new()
    };
    let workout_id = workout.id;

    let target = plan
        .day_mut(day_id)
        .ok_or(Error::NotFound {
            kind: EntityKind::Day,
            id: day_id,
        })?;
    *target = insert_workout(target, workout, at)?;
    let session = target
        .workouts
        .iter()
        .find(|w| w.id == workout_id)
        .map_or(0, |w| w.session_number);

    ws.store.save(&plan)?;
    println!("✓ Added workout {} as session {}", workout_id, session);
    Ok(())
}

fn cmd_remove_workout(ws: &mut Workspace, id: Uuid) -> Result<()> {
    let mut plan = ws.load_plan()?;
    let day_id = plan.day_of_workout(id).ok_or(Error::NotFound {
        kind: EntityKind::Workout,
        id,
    })?;
    if let Some(day) = plan.day_mut(day_id) {
        *day = remove_workout(day, id)?;
    }
    ws.store.save(&plan)?;
    println!("✓ Removed workout {}", id);
    Ok(())
}

fn parse_lap(s: &str) -> Result<Movelap> {
    let (meters, seconds) = s
        .split_once(':')
        .ok_or_else(|| Error::Other(format!("Lap '{}' is not METERS:SECONDS", s)))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|_| Error::Other(format!("Lap '{}' is not METERS:SECONDS", s)))
    };
    Ok(Movelap::distance(parse(meters)?, parse(seconds)?))
}

fn cmd_add_moveframe(ws: &mut Workspace, workout_id: Uuid, moveframe: Moveframe) -> Result<()> {
    let mut plan = ws.load_plan()?;
    let moveframe_id = moveframe.id;

    let workout = plan.workout_mut(workout_id).ok_or(Error::NotFound {
        kind: EntityKind::Workout,
        id: workout_id,
    })?;
    *workout = insert_moveframe(workout, moveframe, None)?;
    let letter = workout
        .moveframes
        .iter()
        .find(|m| m.id == moveframe_id)
        .map(|m| m.letter.clone())
        .unwrap_or_default();

    ws.store.save(&plan)?;
    println!("✓ Added moveframe {} as {}", moveframe_id, letter);
    Ok(())
}

fn cmd_hold(ws: &Workspace, entity: EntityArg, mode: TransferMode) -> Result<()> {
    let plan = ws.load_plan()?;
    let payload = match (entity.day, entity.workout, entity.moveframe) {
        (Some(day), _, _) => Payload::find(&plan, EntityKind::Day, day.resolve(&plan)?)?,
        (_, Some(id), _) => Payload::find(&plan, EntityKind::Workout, id)?,
        (_, _, Some(id)) => Payload::find(&plan, EntityKind::Moveframe, id)?,
        _ => return Err(Error::Other("Nothing selected".into())),
    };

    let kind = payload.kind();
    let mut clipboard = ws.load_clipboard()?;
    match mode {
        TransferMode::Copy => clipboard.copy(payload),
        TransferMode::Cut => clipboard.cut(payload),
    }
    ws.save_clipboard(&clipboard)?;

    let verb = match mode {
        TransferMode::Copy => "Copied",
        TransferMode::Cut => "Cut",
    };
    println!("✓ {} {} to clipboard", verb, kind);
    Ok(())
}

fn cmd_paste(ws: &mut Workspace, arg: PasteArg) -> Result<()> {
    let plan = ws.load_plan()?;
    let target = if let Some(number) = arg.into_week {
        let week = plan
            .weeks
            .iter()
            .find(|w| w.number == number)
            .ok_or_else(|| Error::Other(format!("No week {} in this plan", number)))?;
        PasteTarget::Week {
            id: week.id,
            date: arg.date,
        }
    } else if let Some(day) = arg.into_day {
        PasteTarget::Day {
            id: day.resolve(&plan)?,
            at: arg.at,
        }
    } else if let Some(id) = arg.into_workout {
        PasteTarget::Workout { id, at: arg.at }
    } else {
        return Err(Error::Other(
            "Choose a target: --into-week, --into-day or --into-workout".into(),
        ));
    };

    let mut clipboard = ws.load_clipboard()?;
    let pasted = clipboard.paste_into_store(&mut ws.store, target)?;
    ws.save_clipboard(&clipboard)?;

    println!("✓ Pasted as {}", pasted.pasted_id);
    if let Some(source) = pasted.removed_source {
        println!("  Moved from {}", source);
    }
    Ok(())
}

fn cmd_validate(ws: &mut Workspace, repair: bool) -> Result<()> {
    let mut plan = ws.load_plan()?;
    let violations = validate_plan(&plan);

    if violations.is_empty() {
        println!("✓ Plan is consistent");
        return Ok(());
    }

    for violation in &violations {
        eprintln!("  - {}", violation);
    }

    if !repair {
        return Err(Error::Other(format!(
            "Plan has {} violations (run with --repair to renumber)",
            violations.len()
        )));
    }

    for week in &mut plan.weeks {
        for day in &mut week.days {
            resequence_day(day);
        }
    }
    let remaining = validate_plan(&plan);
    ws.store.save(&plan)?;
    println!(
        "✓ Repaired plan ({} violations before, {} remaining)",
        violations.len(),
        remaining.len()
    );
    Ok(())
}

fn day_label(day: &Day) -> String {
    match (day.date, day.slot) {
        (Some(date), _) => date.to_string(),
        (None, Some(slot)) => format!("slot {}", slot),
        (None, None) => "undated".into(),
    }
}

fn cmd_status(ws: &Workspace, rules: StatusRules, today: NaiveDate) -> Result<()> {
    let plan = ws.load_plan()?;
    for day in plan.days() {
        for workout in &day.workouts {
            println!(
                "{:<12} #{} {:<24} {}",
                day_label(day),
                workout.session_number,
                workout.name.as_deref().unwrap_or("-"),
                rules.derive(workout, day, today)
            );
        }
    }
    Ok(())
}

fn cmd_stats(
    ws: &Workspace,
    taxonomy: &SportTaxonomy,
    day: Option<DayRef>,
    workout: Option<Uuid>,
    week: Option<u32>,
    csv: Option<PathBuf>,
) -> Result<()> {
    let plan = ws.load_plan()?;

    let (scope, aggregate) = if let Some(day) = day {
        let id = day.resolve(&plan)?;
        let day = plan.day(id).ok_or(Error::NotFound {
            kind: EntityKind::Day,
            id,
        })?;
        (format!("day {}", day_label(day)), aggregate_day(day, taxonomy))
    } else if let Some(id) = workout {
        let workout = plan.workout(id).ok_or(Error::NotFound {
            kind: EntityKind::Workout,
            id,
        })?;
        (format!("workout {}", id), aggregate_workout(workout, taxonomy))
    } else if let Some(number) = week {
        let week = plan
            .weeks
            .iter()
            .find(|w| w.number == number)
            .ok_or_else(|| Error::Other(format!("No week {} in this plan", number)))?;
        (format!("week {}", number), aggregate_week(week, taxonomy))
    } else {
        ("plan".to_string(), aggregate_plan(&plan, taxonomy))
    };

    println!("Totals for {}", scope);
    for (sport, totals) in &aggregate.per_sport {
        print_totals(sport.as_str(), &taxonomy.info(sport).distance_unit, totals);
    }
    print_totals("total", "m", &aggregate.grand);
    if aggregate.malformed_fields > 0 {
        println!("  ({} unreadable fields counted as zero)", aggregate.malformed_fields);
    }

    if let Some(path) = csv {
        plan_core::report::export_totals_csv(&aggregate, taxonomy, &path)?;
        println!("✓ Exported totals to {}", path.display());
    }
    Ok(())
}

fn print_totals(label: &str, unit: &str, totals: &SportTotals) {
    println!(
        "  {:<10} workouts {:>2}  moveframes {:>3}  movelaps {:>4}  {:>7} {:<4} {}  series {}  reps {}",
        label,
        totals.workout_count,
        totals.moveframe_count,
        totals.movelap_count,
        totals.distance_meters,
        unit,
        format_deciseconds(totals.duration_deciseconds),
        totals.series,
        totals.repetitions
    );
}

fn cmd_density(ws: &Workspace) -> Result<()> {
    let plan = ws.load_plan()?;
    println!(
        "Plan density: {} ({} active workouts)",
        classify_plan_density(&plan),
        plan_core::classification::active_workout_count(&plan)
    );
    for week in &plan.weeks {
        println!("  Week {}: {}", week.number, classify_week_density(week));
    }
    Ok(())
}

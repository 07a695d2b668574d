use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use cargodesk::api::ApiClient;
use cargodesk::config::Settings;
use cargodesk::error::CargoError;
use cargodesk::export::{self, Exportable};
use cargodesk::model::{
    AccountStatus, AirWaybill, Airport, AirportStatus, AwbStatus, CargoPiece, Dimensions, User,
};
use cargodesk::rate::{self, PieceRateEntry};
use cargodesk::search::{
    self, AirportField, AwbField, DateRange, FilterCriteria, Filterable, UserField,
};
use cargodesk::session::{AppState, SavedSearch};
use cargodesk::weight::{self, summarize_pieces};
use cargodesk::{logging, table};

#[derive(Parser)]
#[command(
    name = "cargodesk",
    about = "Air cargo desk: chargeable weight, AWB rates, record search and export",
    version,
    after_help = "\
Examples:
  cargodesk weight --length 100 --width 100 --height 100 --weight 50
  cargodesk rate --awb awb.json --base-rate 2.5 --other 10
  cargodesk search awbs --file awbs.json -q \"john doe\" --status Booked,Departed
  cargodesk search airports --remote --country finland
  cargodesk export airports --file airports.json --out-dir exports"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Config file (TOML)")]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        help = "Log level [error, warn, info, debug, trace]"
    )]
    log_level: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = ".cargodesk-session.json",
        help = "Session state file"
    )]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(about = "Volume, volumetric and chargeable weight for one piece")]
    Weight(WeightArgs),
    #[command(about = "Generate or override the rate of an AWB")]
    Rate(RateArgs),
    #[command(about = "Compute per-piece charges")]
    PieceRate(PieceRateArgs),
    #[command(
        about = "Filter AWBs, airports or users",
        after_help = "\
Examples:
  Universal:   cargodesk search awbs --file awbs.json -q \"john doe\"
  By field:    cargodesk search awbs --file awbs.json --origin JFK --airline lufthansa
  By status:   cargodesk search awbs --file awbs.json --status \"In Transit,Arrived\"
  Date range:  cargodesk search awbs --file awbs.json --from 2024-01-01 --to 2024-01-31
  Remote:      cargodesk search airports --remote --icao KJ"
    )]
    Search(SearchArgs),
    #[command(about = "Print filtered records as clipboard text")]
    Copy(CopyArgs),
    #[command(about = "Write filtered records to an .xlsx workbook")]
    Export(ExportArgs),
    #[command(subcommand, about = "Approve, reject and delete user accounts")]
    Users(UsersCommand),
    #[command(subcommand, about = "Inspect or change the saved session")]
    Session(SessionCommand),
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Awbs,
    Airports,
    Users,
}

#[derive(clap::Args)]
struct WeightArgs {
    #[arg(long, value_name = "CM", help = "Length in cm")]
    length: Option<f64>,
    #[arg(long, value_name = "CM", help = "Width in cm")]
    width: Option<f64>,
    #[arg(long, value_name = "CM", help = "Height in cm")]
    height: Option<f64>,
    #[arg(short, long, value_name = "KG", help = "Actual weight in kg")]
    weight: String,
    #[arg(long, help = "Output as JSON")]
    json: bool,
}

#[derive(clap::Args)]
struct RateArgs {
    #[arg(long, value_name = "PATH", help = "AWB record (JSON)")]
    awb: PathBuf,
    #[arg(long, value_name = "AMOUNT", help = "Base rate per kg; generates the rate")]
    base_rate: Option<String>,
    #[arg(long, default_value = "0", value_name = "AMOUNT", help = "Flat other charges")]
    other: f64,
    #[arg(
        long,
        value_name = "AMOUNT",
        conflicts_with = "base_rate",
        help = "Set the total by hand (manual override)"
    )]
    total: Option<String>,
    #[arg(long, help = "Replace an existing manual override when generating")]
    force: bool,
    #[arg(long, help = "Write the updated AWB back to the file")]
    in_place: bool,
    #[arg(long, help = "Output the AWB as JSON")]
    json: bool,
    #[arg(long, help = "Output the AWB as pretty-printed JSON")]
    pretty: bool,
}

#[derive(clap::Args)]
struct PieceRateArgs {
    #[arg(long, value_name = "AMOUNT", help = "Base rate per kg; derives the base charge")]
    base_rate: Option<String>,
    #[arg(long, value_name = "KG", help = "Chargeable weight of the piece")]
    chargeable_weight: Option<f64>,
    #[arg(long, default_value = "0", value_name = "AMOUNT")]
    base_charge: f64,
    #[arg(long, default_value = "0", value_name = "AMOUNT")]
    fuel: f64,
    #[arg(long, default_value = "0", value_name = "AMOUNT")]
    security: f64,
    #[arg(long, default_value = "0", value_name = "AMOUNT")]
    other: f64,
    #[arg(long, default_value = "USD", value_name = "CODE")]
    currency: String,
    #[arg(long, help = "Output as JSON")]
    json: bool,
}

#[derive(clap::Args, Default)]
struct FilterArgs {
    #[arg(long, value_name = "PATH", help = "Read records from a JSON file")]
    file: Option<PathBuf>,
    #[arg(long, conflicts_with = "file", help = "Fetch records from the cargo API")]
    remote: bool,

    #[arg(long, value_name = "TEXT")]
    awb_no: Option<String>,
    #[arg(long, value_name = "TEXT")]
    mawb_no: Option<String>,
    #[arg(long, value_name = "TEXT")]
    airline: Option<String>,
    #[arg(long, value_name = "TEXT")]
    customer: Option<String>,
    #[arg(long, value_name = "TEXT")]
    origin: Option<String>,
    #[arg(long, value_name = "TEXT")]
    destination: Option<String>,
    #[arg(long, value_name = "TEXT")]
    shipper: Option<String>,
    #[arg(long, value_name = "TEXT")]
    consignee: Option<String>,

    #[arg(long, value_name = "TEXT")]
    icao: Option<String>,
    #[arg(long, value_name = "TEXT")]
    iata: Option<String>,
    #[arg(long, value_name = "TEXT")]
    name: Option<String>,
    #[arg(long, value_name = "TEXT")]
    city: Option<String>,
    #[arg(long, value_name = "TEXT")]
    country: Option<String>,

    #[arg(long, value_name = "TEXT")]
    email: Option<String>,
    #[arg(long, value_name = "TEXT")]
    role: Option<String>,

    #[arg(
        long,
        value_name = "STATUS,...",
        value_delimiter = ',',
        help = "Keep only these statuses (comma-separated)"
    )]
    status: Vec<String>,
    #[arg(long, value_name = "YYYY-MM-DD", help = "Earliest date (inclusive)")]
    from: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD", help = "Latest date (inclusive, whole day)")]
    to: Option<String>,
    #[arg(short, long, value_name = "TEXT", help = "Free-text search across all fields")]
    query: Option<String>,
}

#[derive(clap::Args)]
struct SearchArgs {
    #[arg(value_enum)]
    kind: Kind,
    #[command(flatten)]
    filters: FilterArgs,
    #[arg(long, help = "One line per record")]
    compact: bool,
    #[arg(long, help = "Output as JSON")]
    json: bool,
    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,
    #[arg(long, help = "Do not mark matches in table output")]
    no_highlight: bool,
    #[arg(long, help = "Remember this search in the session file")]
    remember: bool,
}

#[derive(clap::Args)]
struct CopyArgs {
    #[arg(value_enum)]
    kind: Kind,
    #[command(flatten)]
    filters: FilterArgs,
}

#[derive(clap::Args)]
struct ExportArgs {
    #[arg(value_enum)]
    kind: Kind,
    #[command(flatten)]
    filters: FilterArgs,
    #[arg(long, value_name = "DIR", help = "Output directory (default from config)")]
    out_dir: Option<PathBuf>,
    #[arg(long, help = "Open the workbook after writing it")]
    open: bool,
}

#[derive(clap::Subcommand)]
enum UsersCommand {
    #[command(about = "List accounts")]
    List {
        #[arg(long, help = "Only accounts awaiting approval")]
        pending: bool,
        #[arg(short, long, value_name = "TEXT")]
        query: Option<String>,
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "Approve a pending account")]
    Approve { id: String },
    #[command(about = "Reject a pending account")]
    Reject { id: String },
    #[command(about = "Delete an account")]
    Delete { id: String },
}

#[derive(clap::Subcommand)]
enum SessionCommand {
    #[command(about = "Show the saved session")]
    Show,
    #[command(about = "Select the AWB to work on")]
    Select { awb: PathBuf },
    #[command(about = "Load the pieces of the selected AWB and refresh its totals")]
    Pieces { pieces: PathBuf },
    #[command(about = "Forget the selected AWB")]
    Clear,
}

fn error_code(err: &CargoError) -> i32 {
    match err {
        e if e.is_local() => 2,
        CargoError::NotFound(_) => 4,
        CargoError::Timeout
        | CargoError::ConnectionFailed(_)
        | CargoError::Conflict(_)
        | CargoError::Remote { .. }
        | CargoError::Decode(_) => 3,
        CargoError::Export(_) | CargoError::Io(_) => 5,
        CargoError::Config(_) => 6,
        _ => 1,
    }
}

fn die(err: &CargoError, json_mode: bool) -> ! {
    if json_mode {
        let json = serde_json::json!({
            "error": {
                "kind": err.kind(),
                "message": err.to_string(),
            }
        });
        println!("{json}");
    } else {
        eprintln!("error: {err}");
    }
    process::exit(error_code(err));
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CargoError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CargoError::Io(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| CargoError::Decode(format!("{}: {e}", path.display())))
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, CargoError> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    out.map_err(|e| CargoError::Decode(e.to_string()))
}

fn reject_flags(kind: &str, flags: &[(&str, &Option<String>)]) -> Result<(), CargoError> {
    match flags.iter().find(|(_, v)| v.is_some()) {
        Some((flag, _)) => Err(CargoError::Validation(format!(
            "{flag} does not apply to {kind}"
        ))),
        None => Ok(()),
    }
}

fn build_criteria<F: Copy + Eq>(
    args: &FilterArgs,
    fields: Vec<(F, &Option<String>)>,
    canonical_status: fn(&str) -> Result<&'static str, CargoError>,
) -> Result<FilterCriteria<F>, CargoError> {
    let mut criteria = FilterCriteria::default();
    for (field, value) in fields {
        if let Some(v) = value {
            criteria = criteria.with_field(field, v.clone());
        }
    }
    for status in args.status.iter().filter(|s| !s.trim().is_empty()) {
        criteria = criteria.with_status(canonical_status(status)?, true);
    }
    criteria = criteria.with_dates(DateRange::parse(args.from.as_deref(), args.to.as_deref())?);
    if let Some(ref q) = args.query {
        criteria = criteria.with_query(q.clone());
    }
    Ok(criteria)
}

trait Listing: Filterable + DeserializeOwned + Sized {
    const KIND: &'static str;

    async fn fetch(client: &ApiClient) -> Result<Vec<Self>, CargoError>;

    fn criteria(args: &FilterArgs) -> Result<FilterCriteria<Self::Field>, CargoError>;

    fn render(records: &[Self], highlight: &str) -> String;

    fn compact(&self) -> String;
}

impl Listing for AirWaybill {
    const KIND: &'static str = "awbs";

    async fn fetch(client: &ApiClient) -> Result<Vec<Self>, CargoError> {
        client.list_awbs().await
    }

    fn criteria(args: &FilterArgs) -> Result<FilterCriteria<AwbField>, CargoError> {
        reject_flags(
            Self::KIND,
            &[
                ("--icao", &args.icao),
                ("--iata", &args.iata),
                ("--name", &args.name),
                ("--city", &args.city),
                ("--country", &args.country),
                ("--email", &args.email),
                ("--role", &args.role),
            ],
        )?;
        build_criteria(
            args,
            vec![
                (AwbField::AwbNo, &args.awb_no),
                (AwbField::MawbNo, &args.mawb_no),
                (AwbField::Airline, &args.airline),
                (AwbField::Customer, &args.customer),
                (AwbField::Origin, &args.origin),
                (AwbField::Destination, &args.destination),
                (AwbField::Shipper, &args.shipper),
                (AwbField::Consignee, &args.consignee),
            ],
            |s| AwbStatus::from_str_loose(s).map(|v| v.as_str()),
        )
    }

    fn render(records: &[Self], highlight: &str) -> String {
        table::render_awbs(records, highlight)
    }

    fn compact(&self) -> String {
        table::compact_awb(self)
    }
}

impl Listing for Airport {
    const KIND: &'static str = "airports";

    async fn fetch(client: &ApiClient) -> Result<Vec<Self>, CargoError> {
        client.list_airports().await
    }

    fn criteria(args: &FilterArgs) -> Result<FilterCriteria<AirportField>, CargoError> {
        reject_flags(
            Self::KIND,
            &[
                ("--awb-no", &args.awb_no),
                ("--mawb-no", &args.mawb_no),
                ("--airline", &args.airline),
                ("--customer", &args.customer),
                ("--origin", &args.origin),
                ("--destination", &args.destination),
                ("--shipper", &args.shipper),
                ("--consignee", &args.consignee),
                ("--email", &args.email),
                ("--role", &args.role),
            ],
        )?;
        build_criteria(
            args,
            vec![
                (AirportField::Icao, &args.icao),
                (AirportField::Iata, &args.iata),
                (AirportField::Name, &args.name),
                (AirportField::City, &args.city),
                (AirportField::Country, &args.country),
            ],
            |s| AirportStatus::from_str_loose(s).map(|v| v.as_str()),
        )
    }

    fn render(records: &[Self], highlight: &str) -> String {
        table::render_airports(records, highlight)
    }

    fn compact(&self) -> String {
        table::compact_airport(self)
    }
}

impl Listing for User {
    const KIND: &'static str = "users";

    async fn fetch(client: &ApiClient) -> Result<Vec<Self>, CargoError> {
        client.list_users().await
    }

    fn criteria(args: &FilterArgs) -> Result<FilterCriteria<UserField>, CargoError> {
        reject_flags(
            Self::KIND,
            &[
                ("--awb-no", &args.awb_no),
                ("--mawb-no", &args.mawb_no),
                ("--airline", &args.airline),
                ("--customer", &args.customer),
                ("--origin", &args.origin),
                ("--destination", &args.destination),
                ("--shipper", &args.shipper),
                ("--consignee", &args.consignee),
                ("--icao", &args.icao),
                ("--iata", &args.iata),
                ("--city", &args.city),
                ("--country", &args.country),
            ],
        )?;
        build_criteria(
            args,
            vec![
                (UserField::Name, &args.name),
                (UserField::Email, &args.email),
                (UserField::Role, &args.role),
            ],
            |s| AccountStatus::from_str_loose(s).map(|v| v.as_str()),
        )
    }

    fn render(records: &[Self], highlight: &str) -> String {
        table::render_users(records, highlight)
    }

    fn compact(&self) -> String {
        format!("{} | {} | {} | {}", self.name, self.email, self.role, self.status)
    }
}

async fn collect<T: Listing>(
    args: &FilterArgs,
    settings: &Settings,
) -> Result<(Vec<T>, FilterCriteria<T::Field>), CargoError> {
    let criteria = T::criteria(args)?;
    let records: Vec<T> = match (&args.file, args.remote) {
        (Some(path), _) => read_json(path)?,
        (None, true) => {
            let client = ApiClient::new(&settings.api)?;
            T::fetch(&client).await?
        }
        (None, false) => {
            return Err(CargoError::Validation(
                "--file or --remote is required".into(),
            ))
        }
    };
    let filtered = search::apply_filters(records, &criteria);
    info!(kind = T::KIND, matched = filtered.len(), "search finished");
    Ok((filtered, criteria))
}

async fn run_search<T: Listing>(args: &SearchArgs, settings: &Settings) -> Result<(), CargoError> {
    let (records, criteria) = collect::<T>(&args.filters, settings).await?;

    if args.json || args.pretty {
        println!("{}", to_json(&records, args.pretty)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No {} found.", T::KIND);
        return Ok(());
    }
    if args.compact {
        for record in &records {
            println!("{}", record.compact());
        }
    } else {
        let highlight = if args.no_highlight {
            String::new()
        } else {
            criteria.highlight_query()
        };
        println!("{}", T::render(&records, &highlight));
    }
    Ok(())
}

async fn run_copy<T: Listing + Exportable>(
    args: &FilterArgs,
    settings: &Settings,
) -> Result<(), CargoError> {
    let (records, _) = collect::<T>(args, settings).await?;
    if records.is_empty() {
        eprintln!("No {} to copy.", T::KIND);
        return Ok(());
    }
    println!("{}", export::format_for_clipboard(&records));
    Ok(())
}

async fn run_export<T: Listing + Exportable>(
    args: &ExportArgs,
    settings: &Settings,
) -> Result<(), CargoError> {
    let (records, _) = collect::<T>(&args.filters, settings).await?;
    if records.is_empty() {
        return Err(CargoError::Validation(format!("no {} to export", T::KIND)));
    }
    let dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| settings.export.output_dir.clone());
    let path = export::export_workbook(
        &records,
        &dir,
        &format!("{}_export", T::KIND),
        settings.export.column_width,
    )?;
    println!("Exported {} {} to {}", records.len(), T::KIND, path.display());

    if args.open {
        open::that(&path)
            .map_err(|e| CargoError::Io(format!("failed to open {}: {e}", path.display())))?;
    }
    Ok(())
}

fn run_weight(args: &WeightArgs) -> Result<(), CargoError> {
    let dims = Dimensions {
        length_cm: args.length,
        width_cm: args.width,
        height_cm: args.height,
    };
    weight::validate_dimensions(&dims)?;

    let chargeable = weight::compute_chargeable_weight(&args.weight, &dims);
    if chargeable.is_empty() {
        return Err(CargoError::InvalidWeight(format!(
            "weight \"{}\" is not a number",
            args.weight
        )));
    }
    let actual: f64 = args.weight.trim().parse().unwrap_or(0.0);
    weight::validate_weight(actual)?;

    let volume = weight::volume_of(&dims);
    let volumetric = weight::round2(weight::volumetric_weight_kg(&dims));

    if args.json {
        let json = serde_json::json!({
            "volumeCm3": volume,
            "volumetricWeightKg": volumetric,
            "actualWeightKg": actual,
            "chargeableWeightKg": chargeable,
        });
        println!("{json}");
    } else {
        println!("Volume:            {volume} cm³");
        println!("Volumetric weight: {volumetric:.2} kg");
        println!("Actual weight:     {actual:.2} kg");
        println!("Chargeable weight: {chargeable} kg");
    }
    Ok(())
}

fn run_rate(args: &RateArgs) -> Result<(), CargoError> {
    let mut awb: AirWaybill = read_json(&args.awb)?;

    if let Some(ref total) = args.total {
        rate::override_total(&mut awb, total)?;
    } else if let Some(ref base) = args.base_rate {
        if rate::would_discard_override(&awb) && !args.force {
            return Err(CargoError::Validation(
                "this AWB has a manual total override; re-run with --force to replace it \
                 with a generated rate"
                    .into(),
            ));
        }
        rate::generate_awb_rate(&mut awb, rate::parse_base_rate(base), args.other)?;
    }

    if args.in_place {
        let text = to_json(&awb, true)?;
        std::fs::write(&args.awb, text)
            .map_err(|e| CargoError::Io(format!("cannot write {}: {e}", args.awb.display())))?;
    }

    if args.json || args.pretty {
        println!("{}", to_json(&awb, args.pretty)?);
        return Ok(());
    }
    match awb.rates {
        Some(ref rates) => {
            println!("AWB {}", awb.awb_no);
            println!("{}", table::render_rates(&rates.rates));
        }
        None => println!("AWB {} has no rates yet.", awb.awb_no),
    }
    Ok(())
}

fn run_piece_rate(args: &PieceRateArgs) -> Result<(), CargoError> {
    let mut entry = PieceRateEntry::default();
    entry.set_base_charge(args.base_charge);
    entry.fuel_surcharge = args.fuel;
    entry.security_surcharge = args.security;
    entry.other_charges = args.other;
    entry.currency = args.currency.clone();
    if let Some(ref base) = args.base_rate {
        let weight = args.chargeable_weight.ok_or_else(|| {
            CargoError::Validation("--chargeable-weight is required with --base-rate".into())
        })?;
        entry.generate_base_charge(rate::parse_base_rate(base), weight)?;
    }
    let rates = rate::piece_rate(&entry)?;

    if args.json {
        println!("{}", to_json(&rates, false)?);
    } else {
        println!("{}", table::render_rates(&rates));
    }
    Ok(())
}

async fn run_users(cmd: &UsersCommand, settings: &Settings) -> Result<(), CargoError> {
    let client = ApiClient::new(&settings.api)?;
    match cmd {
        UsersCommand::List {
            pending,
            query,
            json,
        } => {
            let users = if *pending {
                client.list_pending_users().await?
            } else {
                client.list_users().await?
            };
            let criteria = FilterCriteria::<UserField>::default()
                .with_query(query.clone().unwrap_or_default());
            let users = search::apply_filters(users, &criteria);
            if *json {
                println!("{}", to_json(&users, false)?);
            } else if users.is_empty() {
                println!("No users found.");
            } else {
                println!("{}", table::render_users(&users, &criteria.highlight_query()));
            }
        }
        UsersCommand::Approve { id } => {
            let user = client.approve_user(id).await?;
            println!("Approved {} <{}>", user.name, user.email);
        }
        UsersCommand::Reject { id } => {
            let user = client.reject_user(id).await?;
            println!("Rejected {} <{}>", user.name, user.email);
        }
        UsersCommand::Delete { id } => {
            client.delete_user(id).await?;
            println!("Deleted user {id}");
        }
    }
    Ok(())
}

fn run_session(cmd: &SessionCommand, state_path: &Path) -> Result<(), CargoError> {
    let mut state = AppState::load(state_path)?;
    match cmd {
        SessionCommand::Show => {
            println!("{}", to_json(&state, true)?);
            return Ok(());
        }
        SessionCommand::Select { awb } => {
            let awb: AirWaybill = read_json(awb)?;
            println!("Selected AWB {}", awb.awb_no);
            state.select_awb(awb);
        }
        SessionCommand::Pieces { pieces } => {
            let pieces: Vec<CargoPiece> = read_json(pieces)?;
            if state.awb_details().is_none() {
                return Err(CargoError::Validation(
                    "no AWB selected; run `cargodesk session select` first".into(),
                ));
            }
            let totals = summarize_pieces(&pieces);
            state.set_pieces(pieces);
            println!(
                "{} pieces, {:.2} kg, chargeable {:.2} kg",
                totals.pieces, totals.weight_kg, totals.chargeable_weight_kg
            );
        }
        SessionCommand::Clear => {
            state.clear_awb();
            println!("Session cleared.");
        }
    }
    state.save(state_path)
}

fn remember_search(args: &SearchArgs, state_path: &Path) -> Result<(), CargoError> {
    let mut state = AppState::load(state_path)?;
    state.set_last_search(SavedSearch {
        query: args.filters.query.clone().unwrap_or_default(),
        statuses: args.filters.status.clone(),
        from: args.filters.from.clone(),
        to: args.filters.to.clone(),
    });
    state.save(state_path)
}

fn users_not_exportable() -> CargoError {
    CargoError::Validation("copy and export support awbs and airports only".into())
}

fn is_json(cmd: &Commands) -> bool {
    match cmd {
        Commands::Weight(a) => a.json,
        Commands::Rate(a) => a.json || a.pretty,
        Commands::PieceRate(a) => a.json,
        Commands::Search(a) => a.json || a.pretty,
        Commands::Users(UsersCommand::List { json, .. }) => *json,
        _ => false,
    }
}

async fn run(cli: &Cli, settings: &Settings) -> Result<(), CargoError> {
    match &cli.command {
        Commands::Weight(args) => run_weight(args),
        Commands::Rate(args) => run_rate(args),
        Commands::PieceRate(args) => run_piece_rate(args),
        Commands::Search(args) => {
            match args.kind {
                Kind::Awbs => run_search::<AirWaybill>(args, settings).await?,
                Kind::Airports => run_search::<Airport>(args, settings).await?,
                Kind::Users => run_search::<User>(args, settings).await?,
            }
            if args.remember {
                remember_search(args, &cli.state)?;
            }
            Ok(())
        }
        Commands::Copy(args) => match args.kind {
            Kind::Awbs => run_copy::<AirWaybill>(&args.filters, settings).await,
            Kind::Airports => run_copy::<Airport>(&args.filters, settings).await,
            Kind::Users => Err(users_not_exportable()),
        },
        Commands::Export(args) => match args.kind {
            Kind::Awbs => run_export::<AirWaybill>(args, settings).await,
            Kind::Airports => run_export::<Airport>(args, settings).await,
            Kind::Users => Err(users_not_exportable()),
        },
        Commands::Users(cmd) => run_users(cmd, settings).await,
        Commands::Session(cmd) => run_session(cmd, &cli.state),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = is_json(&cli.command);

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => die(&e, json_mode),
    };
    let level = cli.log_level.as_deref().unwrap_or(&settings.log.level);
    logging::init(level, settings.log.json);

    if let Err(e) = run(&cli, &settings).await {
        die(&e, json_mode);
    }
}

pub mod brands;
pub mod init;
pub mod login;
pub mod options;
pub mod report;
pub mod status;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::loader;
use crate::models::{Principal, RawTable};
use crate::pipeline::{Filter, FilterSelections, MonthRange, ReportRequest};
use crate::settings::{load_settings, workbook_path, Settings};

#[derive(Parser)]
#[command(name = "marca", version, about = "Monthly weight and revenue reports per brand.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Point marca at a workbook and credentials file.
    Init {
        /// Path to the brands workbook (.xlsx, .xls, .ods or .csv)
        #[arg(long)]
        workbook: String,
        /// Path to the credentials JSON file
        #[arg(long)]
        credentials: Option<String>,
        /// Currency symbol for revenue columns
        #[arg(long)]
        currency: Option<String>,
    },
    /// Log in as a manager.
    Login {
        /// Manager id (prompted when omitted)
        user: Option<String>,
        /// Read the password from stdin instead of the terminal
        #[arg(long = "password-stdin")]
        password_stdin: bool,
    },
    /// Forget the logged-in manager.
    Logout,
    /// Show the current user, workbook and brands.
    Status,
    /// List the brands (sheets) in the workbook.
    Brands,
    /// List the supervisors, representatives and months available to you.
    Options {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Monthly weight and revenue report.
    Report {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Start month label, e.g. Jan/2024
        #[arg(long = "from")]
        from_month: Option<String>,
        /// End month label, e.g. Mar/2024
        #[arg(long = "to")]
        to_month: Option<String>,
        #[command(flatten)]
        output: ReportOutputArgs,
    },
    /// Generate shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Brand and attribute filters shared by `options` and `report`.
#[derive(Args, Clone, Default)]
pub struct SelectionArgs {
    /// Brand (sheet) name; defaults to the first sheet
    #[arg(long)]
    pub brand: Option<String>,
    /// Only this supervisor
    #[arg(long)]
    pub supervisor: Option<String>,
    /// Only this representative
    #[arg(long)]
    pub representative: Option<String>,
    /// Fail when more than one column matches a field
    #[arg(long = "strict-columns")]
    pub strict_columns: bool,
}

#[derive(Args, Clone, Default)]
pub struct ReportOutputArgs {
    /// Output mode: view, text or export
    #[arg(long)]
    pub mode: Option<String>,
    /// Export format: csv, json or text
    #[arg(long)]
    pub format: Option<String>,
    /// Export path (implies export mode)
    #[arg(long)]
    pub output: Option<String>,
}

/// Everything one report run needs, loaded from settings, session and workbook.
pub(crate) struct ReportContext {
    pub settings: Settings,
    pub workbook: PathBuf,
    pub brand: String,
    pub table: RawTable,
}

impl ReportContext {
    pub fn load(brand: Option<&str>) -> Result<Self> {
        let settings = load_settings();
        let workbook = workbook_path(&settings)?;
        let sheets = loader::list_sheets(&workbook)?;
        let brand = loader::select_sheet(&sheets, brand)?;
        let table = loader::load_sheet(&workbook, &brand)?;
        Ok(Self {
            settings,
            workbook,
            brand,
            table,
        })
    }

    pub fn request(&self, principal: Principal, selection: &SelectionArgs, range: MonthRange) -> ReportRequest {
        ReportRequest {
            principal,
            filters: FilterSelections {
                supervisor: Filter::from_option(selection.supervisor.as_deref()),
                representative: Filter::from_option(selection.representative.as_deref()),
            },
            range,
            strict_columns: selection.strict_columns || self.settings.strict_columns,
        }
    }
}

//! Built-in vocabulary with short help texts.

/// Statement keywords valid in DATA steps, PROC steps or open code.
pub const STATEMENTS: &[(&str, &str)] = &[
    ("data", "Begins a DATA step and names the data sets it creates."),
    ("proc", "Begins a PROC step that runs the named procedure."),
    ("run", "Executes the preceding DATA or PROC step."),
    ("quit", "Ends an interactive procedure such as PROC SQL or PROC DATASETS."),
    ("set", "Reads observations from one or more data sets."),
    ("merge", "Joins observations from two or more data sets into one."),
    ("update", "Updates a master data set with transaction observations."),
    ("by", "Names the variables that define BY groups."),
    ("if", "Executes a statement conditionally, or subsets observations."),
    ("then", "Introduces the statement executed when an IF condition is true."),
    ("else", "Introduces the alternative of an IF-THEN statement."),
    ("do", "Begins a DO group or iterative loop, closed by END."),
    ("end", "Closes a DO or SELECT group."),
    ("to", "Gives the stop value of an iterative DO loop."),
    ("while", "Repeats a DO loop while a condition is true."),
    ("until", "Repeats a DO loop until a condition is true."),
    ("output", "Writes the current observation to a data set."),
    ("keep", "Names the variables written to output data sets."),
    ("drop", "Names variables excluded from output data sets."),
    ("retain", "Keeps variable values across DATA step iterations."),
    ("length", "Sets the number of bytes used to store variables."),
    ("format", "Associates formats with variables."),
    ("informat", "Associates informats with variables."),
    ("label", "Assigns descriptive labels to variables."),
    ("input", "Describes the arrangement of raw input data."),
    ("infile", "Names an external file to read with INPUT."),
    ("file", "Names the external file written by PUT."),
    ("put", "Writes lines to the log or to the file named by FILE."),
    ("datalines", "Marks the start of in-stream data lines."),
    ("cards", "Alias of DATALINES."),
    ("array", "Groups variables under a single name."),
    ("select", "Begins a SELECT group of WHEN alternatives."),
    ("when", "Gives one alternative in a SELECT group."),
    ("otherwise", "Gives the fallback alternative in a SELECT group."),
    ("where", "Selects observations that meet a condition."),
    ("rename", "Renames variables in output data sets."),
    ("delete", "Stops processing the current observation."),
    ("return", "Returns to the top of the DATA step."),
    ("stop", "Stops the current DATA step."),
    ("call", "Invokes a CALL routine."),
    ("var", "Names the analysis variables of a procedure."),
    ("class", "Names the classification variables of a procedure."),
    ("tables", "Requests tables from PROC FREQ or PROC TABULATE."),
    ("model", "Specifies the model of a statistical procedure."),
    ("libname", "Associates a library reference with a location."),
    ("filename", "Associates a file reference with an external file."),
    ("options", "Changes the value of system options."),
    ("title", "Sets the title lines of procedure output."),
    ("footnote", "Sets the footnote lines of procedure output."),
    ("ods", "Controls the Output Delivery System."),
    ("and", "Logical AND."),
    ("or", "Logical OR."),
    ("not", "Logical NOT."),
    ("in", "Tests membership in a list of values."),
    ("eq", "Equal to."),
    ("ne", "Not equal to."),
    ("lt", "Less than."),
    ("le", "Less than or equal to."),
    ("gt", "Greater than."),
    ("ge", "Greater than or equal to."),
];

/// Procedures offered after `PROC`.
pub const PROCEDURES: &[(&str, &str)] = &[
    ("print", "Lists the observations of a data set."),
    ("sort", "Orders observations by the BY variables."),
    ("means", "Computes descriptive statistics."),
    ("summary", "Computes descriptive statistics into an output data set."),
    ("freq", "Produces frequency and cross tabulation tables."),
    ("sql", "Runs SQL queries; ends with QUIT."),
    ("contents", "Describes the structure of a data set."),
    ("datasets", "Manages library members; ends with QUIT."),
    ("import", "Reads external data into a data set."),
    ("export", "Writes a data set to an external file."),
    ("transpose", "Turns variables into observations and back."),
    ("report", "Builds detail and summary reports."),
    ("tabulate", "Builds multi-dimensional summary tables."),
    ("univariate", "Describes the distribution of numeric variables."),
    ("corr", "Computes correlation coefficients."),
    ("reg", "Fits linear regression models."),
    ("glm", "Fits general linear models."),
    ("logistic", "Fits logistic regression models."),
    ("ttest", "Performs t tests."),
    ("format", "Creates user-defined formats."),
    ("append", "Adds the observations of one data set to another."),
    ("compare", "Compares two data sets."),
    ("rank", "Computes ranks of numeric variables."),
    ("sgplot", "Creates single-cell statistical graphics."),
];

/// Macro language statements and functions, offered after `%`.
pub const MACRO_STATEMENTS: &[(&str, &str)] = &[
    ("%macro", "Begins a macro definition, closed by %MEND."),
    ("%mend", "Ends a macro definition."),
    ("%let", "Assigns a value to a macro variable."),
    ("%put", "Writes text or macro variable values to the log."),
    ("%if", "Conditionally processes macro text."),
    ("%then", "Introduces the text processed when %IF is true."),
    ("%else", "Introduces the alternative of %IF-%THEN."),
    ("%do", "Begins a macro %DO group or loop."),
    ("%end", "Closes a macro %DO group."),
    ("%global", "Declares global macro variables."),
    ("%local", "Declares macro variables local to the current macro."),
    ("%include", "Includes SAS code from an external file."),
    ("%eval", "Evaluates an integer expression."),
    ("%sysfunc", "Calls a DATA step function from macro code."),
    ("%str", "Masks special characters at compile time."),
    ("%nrstr", "Masks special characters and macro triggers at compile time."),
    ("%upcase", "Converts text to upper case."),
    ("%scan", "Returns the n-th word of a string."),
    ("%substr", "Returns part of a string."),
    ("%symdel", "Deletes global macro variables."),
    ("%return", "Ends execution of the current macro."),
    ("%abort", "Stops the current macro or job."),
];

/// Data set options, offered after an opening parenthesis.
pub const DATASET_OPTIONS: &[(&str, &str)] = &[
    ("keep=", "Variables to read or write."),
    ("drop=", "Variables to exclude."),
    ("rename=", "Renames variables, e.g. rename=(old=new)."),
    ("where=", "Selects observations that meet a condition."),
    ("obs=", "Last observation to process."),
    ("firstobs=", "First observation to process."),
    ("in=", "Names a variable flagging observations from this data set."),
    ("label=", "Data set label."),
];

pub fn is_keyword(word: &str) -> bool {
    STATEMENTS
        .iter()
        .any(|(keyword, _)| keyword.eq_ignore_ascii_case(word))
}

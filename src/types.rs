/// Name of a remote table, as configured by the operator.
/// Examples: `poems`, `words`, `Editorial calendar`
pub type TableName = String;
/// Field name discovered from a record's payload.
/// Examples: `Start`, `Finish`, `Word`
pub type FieldName = String;
/// Synthetic identifier assigned to a normalized entry.
/// Example: `91c5e3c0a2b44f17`
pub type EntryId = String;
/// Identifier of the remote base/collection a table lives in.
/// Example: `appL6vJByD0dxVlnA`
pub type BaseId = String;
/// Plugin identity used to key the context store.
/// Example: `gridsource`
pub type PluginName = String;
/// Opaque continuation token returned by a record source page.
/// Example: `itrXyz123/recAbc456`
pub type PageToken = String;
/// Key of a persisted configuration option or setup answer.
/// Examples: `pointsForJane`, `pointsForJohn`, `watch`
pub type OptionKey = String;

/*!

This is the long-form manual for `panachage` and `listenwahl`.

## The list ballot

In a Swiss proportional election, the ballot has as many lines as there are
seats to fill (4 in the national council example). The voter may:

* take the **pre-printed list** of a party unchanged,
* **strike** candidates from it (the line stays empty),
* **panachage**: write candidates of other parties on the empty lines,
* **cumulate**: write the same candidate a second time,
* start from a **blank list**, optionally with a name of their own, and write
  candidates on it one by one.

At most two lines may carry the same candidate, and the ballot never has more
lines than seats.

## Counting

Each line counts as one candidate vote, and as one party vote for the party of that
candidate, whatever list the ballot started from. When the ballot started from a
party list, the lines left empty count as party votes for this list. The empty lines
of a blank list are lost.

| Ballot (list FDP, 4 seats)           | FDP | SP |
|--------------------------------------|-----|----|
| FDP list unchanged                   | 4   | 0  |
| one FDP candidate struck             | 4   | 0  |
| one FDP candidate replaced by an SP  | 3   | 1  |

## Seats

The seats are distributed with the largest remainder method (Hare quota). Each
party gets the integer part of `votes / total * seats`, the remaining seats go to
the largest fractional parts. Equal remainders are resolved in the order of the
parties in the reference data. Without any vote, no seat is distributed.

The distribution computed for a single ballot only illustrates the method: in a
real election, all the ballots of the constituency are added first.

## Command scripts

`listenwahl` reads one command per line, from a file (`--input`) or from the
standard input. Everything after a `#` is a comment, empty lines are skipped.
Refused commands (a full ballot, a third vote for the same candidate) are reported
and the script goes on.

```text
select sp          # pre-printed list of the party with id `sp`
select blank       # blank list
name Meine Liste   # name of the blank list
add fdp2           # write the candidate with id `fdp2`
remove 2           # strike the second line of the ballot
reset
tally              # compute and show the results
tutorial start
tutorial stop
wait 1500          # let 1500 ms pass (tutorial pause)
show               # print the ballot
```

With `--out`, the final ballot and its results are written as a JSON summary. With
`--reference`, this summary is compared with an expected one, and the differences are
printed. `--print` writes the ballot and its seat table as an HTML document.

## Reference data

The parties are read with `--parties`, either in JSON:

```json
{"parties": [
  {"id": "sp", "name": "SP - Sozialdemokratische Partei", "color": "red",
   "candidates": [{"id": "sp1", "name": "Anna Müller"}]}
]}
```

or as a CSV file with a header row and the columns
`partyId,partyName,candidateId,candidateName`. Without this flag, the four parties
of the national council example are used.

*/
